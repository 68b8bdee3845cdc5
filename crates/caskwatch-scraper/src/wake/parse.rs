//! Regex extraction of store stock from the Wake County search results page.
//!
//! Page shape, per matched product:
//!
//! ```text
//! <div class="wake-product">
//!   <h4>Product Name</h4>
//!   <p class="out-of-stock">...</p>            (only when nothing is available)
//!   <div class="inventory-collapse"><ul>
//!     <li><span class="address">7200 Sandy Fork Rd.<br/>Raleigh, NC 27609</span>
//!         <span class="quantity">24 in stock</span></li>
//!   </ul></div>
//! </div>
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::html_text::inner_text;

static DIV_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<div\b[^>]*?\bclass\s*=\s*["']([^"']*)["'][^>]*>"#).expect("valid regex")
});
static P_OPEN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<p\b[^>]*?\bclass\s*=\s*["']([^"']*)["'][^>]*>"#).expect("valid regex")
});
static SPAN_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<span\b[^>]*?\bclass\s*=\s*["']([^"']*)["'][^>]*>(.*?)</span>"#)
        .expect("valid regex")
});
static H4_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<h4\b[^>]*>(.*?)</h4>").expect("valid regex"));
static LI_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?is)<li\b[^>]*>(.*?)</li>").expect("valid regex"));
static IN_STOCK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)(\d+)\s+in stock").expect("valid regex"));
static NON_ALNUM_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^a-zA-Z0-9]+").expect("valid regex"));

/// One product block from a search results page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ProductListing {
    pub name: String,
    pub out_of_stock: bool,
    pub stores: Vec<StoreStock>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct StoreStock {
    pub address: String,
    pub quantity: u32,
}

fn has_class(classes: &str, wanted: &str) -> bool {
    classes.split_whitespace().any(|c| c == wanted)
}

/// Parses every `div.wake-product` block in `html`.
pub(crate) fn parse_search_results(html: &str) -> Vec<ProductListing> {
    let starts: Vec<(usize, usize)> = DIV_OPEN_RE
        .captures_iter(html)
        .filter(|caps| has_class(&caps[1], "wake-product"))
        .filter_map(|caps| caps.get(0).map(|m| (m.start(), m.end())))
        .collect();

    starts
        .iter()
        .enumerate()
        .map(|(i, &(_, body_start))| {
            let body_end = starts.get(i + 1).map_or(html.len(), |&(next, _)| next);
            parse_product(&html[body_start..body_end])
        })
        .collect()
}

fn parse_product(block: &str) -> ProductListing {
    let name = H4_RE
        .captures(block)
        .map(|caps| inner_text(&caps[1]))
        .unwrap_or_default();

    let out_of_stock = P_OPEN_RE
        .captures_iter(block)
        .any(|caps| has_class(&caps[1], "out-of-stock"));

    let inventory = DIV_OPEN_RE
        .captures_iter(block)
        .find(|caps| has_class(&caps[1], "inventory-collapse"))
        .and_then(|caps| caps.get(0))
        .map_or("", |m| &block[m.end()..]);

    let stores = LI_RE
        .captures_iter(inventory)
        .filter_map(|row| parse_store_row(&row[1]))
        .collect();

    ProductListing {
        name,
        out_of_stock,
        stores,
    }
}

fn parse_store_row(row: &str) -> Option<StoreStock> {
    let mut address = None;
    let mut quantity = 0;
    for caps in SPAN_RE.captures_iter(row) {
        if has_class(&caps[1], "address") {
            address = Some(inner_text(&caps[2]));
        } else if has_class(&caps[1], "quantity") {
            quantity = extract_quantity(&inner_text(&caps[2]));
        }
    }
    address
        .filter(|a| !a.is_empty())
        .map(|address| StoreStock { address, quantity })
}

/// Reads `24` out of `"24 in stock"`; anything else is zero.
pub(crate) fn extract_quantity(text: &str) -> u32 {
    IN_STOCK_RE
        .captures(text)
        .and_then(|caps| caps[1].parse().ok())
        .unwrap_or(0)
}

/// Stable store identifier from the street component of an address.
///
/// `"1601-61 Cross Link Rd. Raleigh, NC 27610"` becomes
/// `"1601-61-cross-link-rd-raleigh"`.
pub(crate) fn slugify_street(address: &str) -> String {
    let street = address.split(',').next().unwrap_or_default().trim();
    let slug = NON_ALNUM_RE
        .replace_all(street, "-")
        .trim_matches('-')
        .to_lowercase();
    if slug.is_empty() {
        "unknown".to_owned()
    } else {
        slug
    }
}
