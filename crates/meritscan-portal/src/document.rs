//! Structured-document queries over portal HTML.
//!
//! Every query returns an explicit absence (`None` or an empty list) when the
//! selector matches nothing; nothing here fails on a missing element.

use crate::error::{PortalError, Result};
use meritscan_core::SelectorConfig;
use scraper::{ElementRef, Html, Selector};

/// Selectors compiled once from [`SelectorConfig`].
#[derive(Debug, Clone)]
pub struct PageSelectors {
    /// CAPTCHA image on the search page
    pub captcha_image: Selector,
    /// Hidden inputs on the search page
    pub hidden_inputs: Selector,
    /// Roll number label on the result page
    pub roll_number: Selector,
    /// Name label on the result page
    pub name: Selector,
    /// Father's name label on the result page
    pub father_name: Selector,
    /// Merit table rows on the result page
    pub merit_rows: Selector,
    /// Cells within a merit row
    pub merit_cells: Selector,
}

impl PageSelectors {
    /// Compile every configured selector.
    ///
    /// # Errors
    /// Returns [`PortalError::InvalidSelector`] naming the first selector that
    /// fails to parse.
    pub fn from_config(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            captcha_image: compile("selectors.captcha_image", &config.captcha_image)?,
            hidden_inputs: compile("selectors.hidden_inputs", &config.hidden_inputs)?,
            roll_number: compile("selectors.roll_number", &config.roll_number)?,
            name: compile("selectors.name", &config.name)?,
            father_name: compile("selectors.father_name", &config.father_name)?,
            merit_rows: compile("selectors.merit_rows", &config.merit_rows)?,
            merit_cells: compile("selectors.merit_cells", &config.merit_cells)?,
        })
    }
}

impl Default for PageSelectors {
    fn default() -> Self {
        Self::from_config(&SelectorConfig::default()).expect("default selectors are valid")
    }
}

fn compile(field: &str, selector: &str) -> Result<Selector> {
    Selector::parse(selector).map_err(|e| PortalError::InvalidSelector {
        field: field.to_string(),
        reason: format!("'{selector}': {e}"),
    })
}

/// A parsed portal page.
///
/// Not `Send`: parse, query and drop it without holding it across an await.
pub struct PageDocument {
    html: Html,
}

impl PageDocument {
    /// Parse a full HTML document.
    #[must_use]
    pub fn parse(html: &str) -> Self {
        Self {
            html: Html::parse_document(html),
        }
    }

    /// Trimmed text of the first element matching `selector`.
    ///
    /// Returns `None` when nothing matches or the text is blank.
    #[must_use]
    pub fn text(&self, selector: &Selector) -> Option<String> {
        self.html.select(selector).next().and_then(element_text)
    }

    /// Attribute `name` of the first element matching `selector`.
    #[must_use]
    pub fn attr(&self, selector: &Selector, name: &str) -> Option<String> {
        self.html
            .select(selector)
            .next()
            .and_then(|el| el.value().attr(name))
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// `(name, value)` pairs of every named input matching `selector`.
    #[must_use]
    pub fn form_fields(&self, selector: &Selector) -> Vec<(String, String)> {
        self.html
            .select(selector)
            .filter_map(|el| {
                let name = el.value().attr("name")?;
                let value = el.value().attr("value").unwrap_or_default();
                Some((name.to_string(), value.to_string()))
            })
            .collect()
    }

    /// Cell texts of every row matching `rows`, in document order.
    ///
    /// Blank cells come back as `None`.
    #[must_use]
    pub fn table_rows(&self, rows: &Selector, cells: &Selector) -> Vec<Vec<Option<String>>> {
        self.html
            .select(rows)
            .map(|row| row.select(cells).map(element_text).collect())
            .collect()
    }
}

fn element_text(element: ElementRef<'_>) -> Option<String> {
    let text = element.text().collect::<String>();
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    (!text.is_empty()).then_some(text)
}
