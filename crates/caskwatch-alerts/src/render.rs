//! Alert message bodies.

use std::fmt::Write as _;

use caskwatch_core::InventoryItem;
use chrono::{DateTime, Utc};

/// A rendered alert, ready for any transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAlert {
    pub subject: String,
    pub text: String,
    pub html: String,
}

#[must_use]
pub fn subject(count: usize) -> String {
    let plural = if count == 1 { "" } else { "s" };
    format!("Cask Watch Alert: {count} New Allocation Item{plural}")
}

fn region(item: &InventoryItem) -> String {
    if item.county.is_empty() {
        item.state.clone()
    } else {
        format!("{} County, {}", item.county, item.state)
    }
}

fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            other => out.push(other),
        }
    }
    out
}

/// One-line summary used by the plain-text body and dry-run previews.
#[must_use]
pub fn item_line(item: &InventoryItem) -> String {
    let mut line = format!(
        "{} ({}): {} at store {} [{}]",
        item.product_name,
        item.product_id,
        item.quantity,
        item.store_id,
        region(item)
    );
    if !item.listing_type.is_empty() {
        let _ = write!(line, " {}", item.listing_type);
    }
    line
}

fn text_body(subscriber_id: &str, items: &[InventoryItem], sent_at: DateTime<Utc>) -> String {
    let mut body = format!(
        "Cask Watch found {} new item(s) matching your preferences ({subscriber_id}).\n\n",
        items.len()
    );
    for item in items {
        let _ = writeln!(body, "- {}", item_line(item));
        if !item.store_url.is_empty() {
            let _ = writeln!(body, "  {}", item.store_url);
        }
    }
    let _ = write!(
        body,
        "\nChecked {}.\nInventory changes quickly; call the store before driving over.\n",
        sent_at.to_rfc2822()
    );
    body
}

fn html_body(subscriber_id: &str, items: &[InventoryItem], sent_at: DateTime<Utc>) -> String {
    let mut rows = String::new();
    for item in items {
        let product = if item.store_url.is_empty() {
            escape_html(&item.product_name)
        } else {
            format!(
                r#"<a href="{}">{}</a>"#,
                escape_html(&item.store_url),
                escape_html(&item.product_name)
            )
        };
        let _ = write!(
            rows,
            "<tr><td>{product}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape_html(&item.product_id),
            escape_html(&item.store_id),
            escape_html(&region(item)),
            escape_html(&item.listing_type),
            item.quantity,
        );
    }

    format!(
        "<!DOCTYPE html>\n<html><body>\
         <h2>Cask Watch: {count} new item(s)</h2>\
         <p>Matches for subscription <strong>{id}</strong>.</p>\
         <table border=\"1\" cellpadding=\"4\" cellspacing=\"0\">\
         <tr><th>Product</th><th>Code</th><th>Store</th><th>Region</th><th>Listing</th><th>Qty</th></tr>\
         {rows}</table>\
         <p><small>Checked {when}. Inventory changes quickly; call the store before driving over.</small></p>\
         </body></html>\n",
        count = items.len(),
        id = escape_html(subscriber_id),
        when = sent_at.to_rfc2822(),
    )
}

/// Renders the subject plus both bodies for one subscriber.
#[must_use]
pub fn render_alert(
    subscriber_id: &str,
    items: &[InventoryItem],
    sent_at: DateTime<Utc>,
) -> RenderedAlert {
    RenderedAlert {
        subject: subject(items.len()),
        text: text_body(subscriber_id, items, sent_at),
        html: html_body(subscriber_id, items, sent_at),
    }
}
