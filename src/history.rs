//! Version-history extraction.
//!
//! SharePoint exposes field-level change history only through the
//! server-rendered `versions.aspx` page, so this module fetches that page
//! and parses its markup into [`VersionRecord`]s.  The page's settings-frame
//! table alternates between two row shapes:
//!
//! - a **summary row** (three cells) describing one version: the version
//!   identifier and number, the timestamp, and the author;
//! - a **detail row** (two cells wrapping a nested body) carrying the
//!   field-level changes of a previously rendered summary row, matched by
//!   the version identifier embedded in the nested rows.
//!
//! Records are returned in document order, which the server renders newest
//! first.  Any violated traversal assumption — missing table, malformed
//! cell, or a change group referencing an unknown version — fails with an
//! explicit `UnparseableHistory` error instead of a panic.

use crate::client::SharePointClient;
use crate::error::{SharePointError, SharePointResult};
use crate::lists::SharePointLists;
use crate::types::{ChangeRecord, VersionAuthor, VersionRecord};
use chrono::NaiveDateTime;
use log::debug;
use scraper::{ElementRef, Html, Selector};

/// Timestamp format the page renders, e.g. `8/23/2026 10:05 AM`.
const PAGE_DATE_FORMAT: &str = "%m/%d/%Y %I:%M %p";

/// Marker preceding the previous value inside a change cell's tooltip.
const PREVIOUS_VALUE_MARKER: &str = "Previous Value: ";

/// Version-history operations.
pub struct VersionHistory<'a> {
    client: &'a SharePointClient,
}

impl<'a> VersionHistory<'a> {
    pub fn new(client: &'a SharePointClient) -> Self {
        Self { client }
    }

    /// Fetch and parse the full version history of a list item, newest
    /// first, with per-field change records populated.
    pub async fn get_version_history(
        &self,
        list: &str,
        item_id: i64,
    ) -> SharePointResult<Vec<VersionRecord>> {
        // The rendered page addresses lists by GUID, not title.
        let resp = SharePointLists::new(self.client).get_list(list).await?;
        let list_id = resp["d"]["Id"]
            .as_str()
            .or_else(|| resp["Id"].as_str())
            .ok_or_else(|| {
                SharePointError::internal(format!("list '{}' response carried no Id", list))
            })?
            .to_string();

        let list_param = format!("{{{}}}", list_id);
        let id_param = item_id.to_string();
        let html = self
            .client
            .get_text(
                "/_layouts/15/versions.aspx",
                &[
                    ("list", list_param.as_str()),
                    ("ID", id_param.as_str()),
                    ("IsDlg", "1"),
                ],
            )
            .await?;

        let records = parse_history_page(&html)?;
        debug!(
            "Parsed {} versions for item {} of '{}'",
            records.len(),
            item_id,
            list
        );
        Ok(records)
    }
}

/// Parse a rendered `versions.aspx` document into version records.
pub fn parse_history_page(html: &str) -> SharePointResult<Vec<VersionRecord>> {
    let doc = Html::parse_document(html);
    let table_sel = Selector::parse("table.ms-settingsframe").unwrap();

    let table = doc.select(&table_sel).next().ok_or_else(|| {
        SharePointError::unparseable_history("history page has no settings-frame table")
    })?;

    // html5ever inserts the implied tbody when the markup omits it.
    let body = child_elements(table, "tbody")
        .into_iter()
        .next()
        .unwrap_or(table);

    let mut records: Vec<VersionRecord> = Vec::new();
    for row in child_elements(body, "tr") {
        let cells = child_elements(row, "td");
        match cells.len() {
            3 => records.push(parse_summary_row(&cells)?),
            2 if has_nested_body(row) => attach_detail_group(row, &mut records)?,
            _ => {} // header and spacer rows
        }
    }

    Ok(records)
}

// ─── Summary rows ────────────────────────────────────────────────────────

fn parse_summary_row(cells: &[ElementRef<'_>]) -> SharePointResult<VersionRecord> {
    let verid_sel = Selector::parse("table[verid]").unwrap();
    let ver_table = cells[0].select(&verid_sel).next().ok_or_else(|| {
        SharePointError::unparseable_history("summary row missing its version table")
    })?;

    let verid = ver_table.value().attr("verid").unwrap_or_default();
    let version_id: i64 = verid.parse().map_err(|_| {
        SharePointError::unparseable_history(format!("non-numeric version identifier '{}'", verid))
    })?;

    let version_text = strip_rendering_whitespace(&element_text(ver_table));
    let version: f64 = version_text.trim().parse().map_err(|_| {
        SharePointError::unparseable_history(format!(
            "non-decimal version number '{}'",
            version_text.trim()
        ))
    })?;

    let date_text = strip_rendering_whitespace(&element_text(cells[1]));
    let date = NaiveDateTime::parse_from_str(date_text.trim(), PAGE_DATE_FORMAT).map_err(|_| {
        SharePointError::unparseable_history(format!(
            "unrecognized version timestamp '{}'",
            date_text.trim()
        ))
    })?;

    Ok(VersionRecord {
        version_id,
        version,
        date,
        author: parse_author(cells[2])?,
        changes: Vec::new(),
    })
}

fn parse_author(cell: ElementRef<'_>) -> SharePointResult<VersionAuthor> {
    let link_sel = Selector::parse("a[href]").unwrap();
    let img_sel = Selector::parse("img[sip]").unwrap();

    let link = cell.select(&link_sel).next().ok_or_else(|| {
        SharePointError::unparseable_history("summary row missing its author link")
    })?;

    let href = link.value().attr("href").unwrap_or_default();
    let id_text = query_param(href, "ID").ok_or_else(|| {
        SharePointError::unparseable_history(format!("author link '{}' carries no ID", href))
    })?;
    let id: i64 = id_text.parse().map_err(|_| {
        SharePointError::unparseable_history(format!("non-numeric author id '{}'", id_text))
    })?;

    let name = strip_rendering_whitespace(&element_text(link))
        .trim()
        .to_string();

    // The presence indicator image carries the author's email.
    let email = cell
        .select(&img_sel)
        .next()
        .and_then(|img| img.value().attr("sip"))
        .ok_or_else(|| {
            SharePointError::unparseable_history("summary row missing its presence indicator")
        })?
        .to_string();

    Ok(VersionAuthor { id, name, email })
}

// ─── Detail rows ─────────────────────────────────────────────────────────

fn attach_detail_group(
    row: ElementRef<'_>,
    records: &mut [VersionRecord],
) -> SharePointResult<()> {
    let tbody_sel = Selector::parse("tbody").unwrap();
    let field_sel = Selector::parse("td.ms-propertysheet").unwrap();
    let value_sel = Selector::parse("td.ms-vb").unwrap();

    let body = row.select(&tbody_sel).next().ok_or_else(|| {
        SharePointError::unparseable_history("detail row missing its nested body")
    })?;
    let rows = child_elements(body, "tr");
    let first = rows.first().ok_or_else(|| {
        SharePointError::unparseable_history("detail row carries an empty change group")
    })?;

    let group_id = first.value().attr("id").ok_or_else(|| {
        SharePointError::unparseable_history("change group carries no version identifier")
    })?;
    let version_id: i64 = group_id.parse().map_err(|_| {
        SharePointError::unparseable_history(format!(
            "non-numeric change-group identifier '{}'",
            group_id
        ))
    })?;

    // Groups may only reference already-emitted summary rows; a dangling
    // reference means the traversal assumptions no longer hold.
    let target = records
        .iter_mut()
        .find(|r| r.version_id == version_id)
        .ok_or_else(|| {
            SharePointError::unparseable_history(format!(
                "change group references unknown version id {}",
                version_id
            ))
        })?;

    let mut changes = Vec::with_capacity(rows.len());
    for change_row in &rows {
        let field = change_row
            .select(&field_sel)
            .next()
            .map(|td| strip_rendering_whitespace(&element_text(td)).trim().to_string());

        let value_cell = change_row.select(&value_sel).next();
        let value = value_cell.map(|td| strip_rendering_whitespace(&element_text(td)));
        let previous_value = value_cell
            .and_then(|td| td.value().attr("title"))
            .and_then(parse_previous_value);

        changes.push(ChangeRecord {
            id: change_row
                .value()
                .attr("id")
                .unwrap_or(group_id)
                .to_string(),
            field,
            previous_value,
            value,
        });
    }

    // Replace wholesale: multiple groups for one version are not expected,
    // but when they occur the last one wins.
    target.changes = changes;
    Ok(())
}

/// Extract the previous value from a change cell's tooltip, formatted as
/// free text followed by `Previous Value: <value>`.
fn parse_previous_value(title: &str) -> Option<String> {
    title
        .split(PREVIOUS_VALUE_MARKER)
        .nth(1)
        .map(|s| strip_rendering_whitespace(s).trim().to_string())
}

// ─── Markup helpers ──────────────────────────────────────────────────────

/// Direct child elements of a node with the given tag name.  Selector-based
/// lookups match descendants, which would leak nested-table cells into the
/// row-shape classification.
fn child_elements<'b>(el: ElementRef<'b>, name: &str) -> Vec<ElementRef<'b>> {
    el.children()
        .filter_map(ElementRef::wrap)
        .filter(|e| e.value().name() == name)
        .collect()
}

fn has_nested_body(row: ElementRef<'_>) -> bool {
    let tbody_sel = Selector::parse("tbody").unwrap();
    row.select(&tbody_sel).next().is_some()
}

fn element_text(el: ElementRef<'_>) -> String {
    el.text().collect()
}

/// Remove the newline and tab characters the rendering engine embeds in
/// cell text.
fn strip_rendering_whitespace(text: &str) -> String {
    text.chars().filter(|c| !matches!(c, '\n' | '\r' | '\t')).collect()
}

/// Value of a query parameter inside a (possibly relative) link href.
fn query_param(href: &str, name: &str) -> Option<String> {
    let query = href.split('?').nth(1)?;
    query.split('&').find_map(|pair| {
        let (k, v) = pair.split_once('=')?;
        (k == name).then(|| v.to_string())
    })
}

// ═══════════════════════════════════════════════════════════════════════
//  Tests
// ═══════════════════════════════════════════════════════════════════════

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, NaiveDateTime};

    fn summary_row(verid: &str, version: &str, date: &str, author_name: &str) -> String {
        format!(
            r#"<tr>
  <td class="ms-vb2"><table verid="{verid}"><tr><td>{version}</td></tr></table></td>
  <td class="ms-vb-title">{date}</td>
  <td class="ms-vb2">
    <a href="/_layouts/15/userdisp.aspx?ID=12&Force=True">{author_name}</a>
    <img src="/_layouts/images/imnhdr.gif" sip="jane@contoso.com">
  </td>
</tr>"#
        )
    }

    fn detail_row(rows: &str) -> String {
        format!(
            r#"<tr>
  <td class="ms-vb2"></td>
  <td class="ms-vb2"><table><tbody>{rows}</tbody></table></td>
</tr>"#
        )
    }

    fn change_row(id: &str, field: &str, title_attr: Option<&str>, value: &str) -> String {
        let title = title_attr
            .map(|t| format!(r#" title="{}""#, t))
            .unwrap_or_default();
        format!(
            r#"<tr id="{id}"><td class="ms-propertysheet">{field}</td><td class="ms-vb"{title}>{value}</td></tr>"#
        )
    }

    fn page(rows: &str) -> String {
        format!(
            r#"<html><body><table class="ms-settingsframe"><tbody>{rows}</tbody></table></body></html>"#
        )
    }

    fn ts(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_end_to_end_two_versions_one_change_group() {
        let html = page(&format!(
            "{}{}{}",
            summary_row("3", "3.0", "8/23/2026 10:05 AM", "Jane Doe"),
            summary_row("2", "2.0", "8/22/2026 9:00 AM", "Jane Doe"),
            detail_row(&change_row(
                "2",
                "Title",
                Some("Changed by editor. Previous Value: Draft"),
                "Final"
            )),
        ));

        let records = parse_history_page(&html).unwrap();
        assert_eq!(records.len(), 2);

        assert_eq!(records[0].version_id, 3);
        assert!(records[0].changes.is_empty());

        assert_eq!(records[1].version_id, 2);
        assert_eq!(records[1].changes.len(), 1);
        let change = &records[1].changes[0];
        assert_eq!(change.field.as_deref(), Some("Title"));
        assert_eq!(change.previous_value.as_deref(), Some("Draft"));
        assert_eq!(change.value.as_deref(), Some("Final"));
    }

    #[test]
    fn test_summary_fields_parsed() {
        let html = page(&summary_row("512", "3.0", "8/23/2026 10:05 AM", "Jane Doe"));
        let records = parse_history_page(&html).unwrap();
        assert_eq!(records.len(), 1);
        let rec = &records[0];
        assert_eq!(rec.version_id, 512);
        assert_eq!(rec.version, 3.0);
        assert_eq!(rec.date, ts(2026, 8, 23, 10, 5));
        assert_eq!(rec.author.id, 12);
        assert_eq!(rec.author.name, "Jane Doe");
        assert_eq!(rec.author.email, "jane@contoso.com");
    }

    #[test]
    fn test_document_order_preserved() {
        let html = page(&format!(
            "{}{}{}",
            summary_row("9", "3.0", "8/23/2026 10:05 AM", "Jane"),
            summary_row("8", "2.0", "8/22/2026 10:05 AM", "Jane"),
            summary_row("7", "1.0", "8/21/2026 10:05 AM", "Jane"),
        ));
        let ids: Vec<i64> = parse_history_page(&html)
            .unwrap()
            .iter()
            .map(|r| r.version_id)
            .collect();
        assert_eq!(ids, vec![9, 8, 7]);
    }

    #[test]
    fn test_whitespace_stripped_from_extracted_text() {
        let html = page(&format!(
            "{}{}",
            summary_row("5", "\n\t2.0", "8/23/2026 \n\t10:05 AM", "Jane\n\tDoe"),
            detail_row(&change_row("5", "\n\tStatus\t", None, "Open\n\titem")),
        ));
        let records = parse_history_page(&html).unwrap();
        assert_eq!(records[0].author.name, "JaneDoe");
        let change = &records[0].changes[0];
        assert_eq!(change.field.as_deref(), Some("Status"));
        assert_eq!(change.value.as_deref(), Some("Openitem"));
    }

    #[test]
    fn test_change_without_tooltip_has_no_previous_value() {
        let html = page(&format!(
            "{}{}",
            summary_row("4", "1.0", "8/20/2026 8:00 AM", "Jane"),
            detail_row(&change_row("4", "Status", None, "Open")),
        ));
        let records = parse_history_page(&html).unwrap();
        let change = &records[0].changes[0];
        assert!(change.previous_value.is_none());
        assert_eq!(change.value.as_deref(), Some("Open"));
    }

    #[test]
    fn test_tooltip_without_marker_has_no_previous_value() {
        let html = page(&format!(
            "{}{}",
            summary_row("4", "1.0", "8/20/2026 8:00 AM", "Jane"),
            detail_row(&change_row("4", "Status", Some("just a tooltip"), "Open")),
        ));
        let records = parse_history_page(&html).unwrap();
        assert!(records[0].changes[0].previous_value.is_none());
    }

    #[test]
    fn test_orphan_change_group_is_unparseable() {
        let html = page(&format!(
            "{}{}",
            summary_row("3", "1.0", "8/20/2026 8:00 AM", "Jane"),
            detail_row(&change_row("99", "Title", None, "Final")),
        ));
        let err = parse_history_page(&html).unwrap_err();
        assert_eq!(err.code, crate::SharePointErrorCode::UnparseableHistory);
        assert!(err.message.contains("99"));
    }

    #[test]
    fn test_last_change_group_wins() {
        let html = page(&format!(
            "{}{}{}",
            summary_row("6", "1.0", "8/20/2026 8:00 AM", "Jane"),
            detail_row(&change_row("6", "Title", None, "First")),
            detail_row(&change_row("6", "Title", None, "Second")),
        ));
        let records = parse_history_page(&html).unwrap();
        assert_eq!(records[0].changes.len(), 1);
        assert_eq!(records[0].changes[0].value.as_deref(), Some("Second"));
    }

    #[test]
    fn test_missing_table_is_unparseable() {
        let err = parse_history_page("<html><body><p>error page</p></body></html>").unwrap_err();
        assert_eq!(err.code, crate::SharePointErrorCode::UnparseableHistory);
        assert!(err.message.contains("settings-frame"));
    }

    #[test]
    fn test_malformed_summary_row_is_unparseable() {
        // Three cells but no nested version table.
        let html = page(r#"<tr><td>a</td><td>b</td><td>c</td></tr>"#);
        let err = parse_history_page(&html).unwrap_err();
        assert_eq!(err.code, crate::SharePointErrorCode::UnparseableHistory);
    }

    #[test]
    fn test_unrecognized_timestamp_is_unparseable() {
        let html = page(&summary_row("3", "1.0", "next Tuesday", "Jane"));
        let err = parse_history_page(&html).unwrap_err();
        assert!(err.message.contains("next Tuesday"));
    }

    #[test]
    fn test_spacer_rows_ignored() {
        let html = page(&format!(
            r#"<tr><td colspan="3">Version history</td></tr>{}"#,
            summary_row("3", "1.0", "8/20/2026 8:00 AM", "Jane"),
        ));
        let records = parse_history_page(&html).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_query_param_extraction() {
        assert_eq!(
            query_param("/_layouts/15/userdisp.aspx?ID=12&Force=True", "ID").as_deref(),
            Some("12")
        );
        assert_eq!(query_param("/_layouts/15/userdisp.aspx", "ID"), None);
        assert_eq!(
            query_param("/_layouts/15/userdisp.aspx?Force=True", "ID"),
            None
        );
    }

    #[test]
    fn test_previous_value_marker_parsing() {
        assert_eq!(
            parse_previous_value("Changed 8/22. Previous Value: Draft").as_deref(),
            Some("Draft")
        );
        assert_eq!(parse_previous_value("no marker here"), None);
    }
}
