//! Terminal rendering of search matches, grid pages and host tables

use crate::index::types::{HostId, Match, PropertyRecord};
use crate::query::hosts::HostAggregate;
use crate::utils::page::{page_count, page_slice};
use serde::Serialize;
use std::io::{self, Write};
use termcolor::{Color, ColorSpec, WriteColor};

/// One page of the filtered grid, as emitted by `--json`
#[derive(Debug, Serialize)]
pub struct GridPage<'a> {
    pub page: usize,
    pub page_count: usize,
    pub total: usize,
    pub properties: &'a [&'a PropertyRecord],
}

impl<'a> GridPage<'a> {
    pub fn new(filtered: &'a [&'a PropertyRecord], page: usize, page_size: usize) -> Self {
        Self {
            page: page.max(1),
            page_count: page_count(filtered.len(), page_size),
            total: filtered.len(),
            properties: page_slice(filtered, page, page_size),
        }
    }
}

/// Print type-ahead matches as `id  name`
pub fn print_matches<W: WriteColor>(out: &mut W, matches: &[Match]) -> io::Result<()> {
    if matches.is_empty() {
        writeln!(out, "Enter a property name...")?;
        return Ok(());
    }

    let width = matches
        .iter()
        .map(|m| m.id.to_string().len())
        .max()
        .unwrap_or(1);

    for m in matches {
        out.set_color(ColorSpec::new().set_fg(Some(Color::Green)))?;
        write!(out, "{:>width$}", m.id, width = width)?;
        out.reset()?;
        writeln!(out, "  {}", m.name)?;
    }

    Ok(())
}

/// Print one grid page with a footer, or the empty-state message
pub fn print_grid_page<W: WriteColor>(out: &mut W, page: &GridPage<'_>) -> io::Result<()> {
    if page.total == 0 {
        writeln!(out, "No Properties Found")?;
        return Ok(());
    }

    for property in page.properties {
        print_property_card(out, property)?;
    }

    out.set_color(ColorSpec::new().set_fg(Some(Color::Cyan)))?;
    writeln!(
        out,
        "Page {} of {} ({} properties)",
        page.page, page.page_count, page.total
    )?;
    out.reset()?;

    Ok(())
}

fn print_property_card<W: WriteColor>(out: &mut W, property: &PropertyRecord) -> io::Result<()> {
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "{}", property.name)?;
    out.reset()?;

    out.set_color(ColorSpec::new().set_fg(Some(Color::Magenta)))?;
    writeln!(out, "  #{}", property.id)?;
    out.reset()?;

    if let Some(location) = property.location_label() {
        writeln!(out, "  {}", location)?;
    }

    write!(out, "  ")?;
    out.set_color(ColorSpec::new().set_fg(Some(Color::Yellow)))?;
    write!(out, "★ {}", property.stars)?;
    out.reset()?;

    write!(out, "  ")?;
    out.set_color(ColorSpec::new().set_bold(true))?;
    write!(out, "${}", property.rate)?;
    out.reset()?;
    writeln!(
        out,
        "/night  {} · {} · {}",
        property.house_type, property.place_type, property.country
    )?;

    writeln!(out)?;
    Ok(())
}

/// Print per-host aggregates, best average first
pub fn print_hosts<W: WriteColor>(
    out: &mut W,
    hosts: &[(HostId, HostAggregate)],
) -> io::Result<()> {
    if hosts.is_empty() {
        writeln!(out, "No hosts found")?;
        return Ok(());
    }

    writeln!(out, "{:>10}  {:>10}  {:>8}  {}", "HOST", "LISTINGS", "AVERAGE", "SUPER HOST")?;
    for (host_id, aggregate) in hosts {
        write!(
            out,
            "{:>10}  {:>10}  {:>8.2}  ",
            host_id,
            aggregate.property_count,
            aggregate.average_stars()
        )?;
        if aggregate.is_super_host() {
            out.set_color(ColorSpec::new().set_fg(Some(Color::Green)).set_bold(true))?;
            writeln!(out, "yes")?;
            out.reset()?;
        } else {
            writeln!(out, "no")?;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use termcolor::Buffer;

    fn listing(id: u64, name: &str) -> PropertyRecord {
        PropertyRecord {
            id,
            name: name.to_string(),
            host_id: 1,
            country: "US".to_string(),
            rate: 120.0,
            stars: 4.5,
            house_type: "House".to_string(),
            place_type: "Entire place".to_string(),
            city: Some("Austin".to_string()),
            territory: Some("TX".to_string()),
            image_src: None,
            image_alt_text: None,
        }
    }

    fn render(f: impl FnOnce(&mut Buffer) -> io::Result<()>) -> String {
        let mut buffer = Buffer::no_color();
        f(&mut buffer).unwrap();
        String::from_utf8(buffer.into_inner()).unwrap()
    }

    #[test]
    fn test_print_matches() {
        let matches = vec![Match::new(1, "Sunny Cabin"), Match::new(12, "Sunset Villa")];
        let text = render(|b| print_matches(b, &matches));
        assert_eq!(text, " 1  Sunny Cabin\n12  Sunset Villa\n");
    }

    #[test]
    fn test_print_no_matches() {
        let text = render(|b| print_matches(b, &[]));
        assert_eq!(text, "Enter a property name...\n");
    }

    #[test]
    fn test_grid_page_empty_state() {
        let filtered: Vec<&PropertyRecord> = Vec::new();
        let page = GridPage::new(&filtered, 1, 10);
        let text = render(|b| print_grid_page(b, &page));
        assert_eq!(text, "No Properties Found\n");
    }

    #[test]
    fn test_grid_page_card_and_footer() {
        let records: Vec<PropertyRecord> = (1..=12)
            .map(|i| listing(i, &format!("Home {}", i)))
            .collect();
        let filtered: Vec<&PropertyRecord> = records.iter().collect();

        let page = GridPage::new(&filtered, 2, 10);
        assert_eq!(page.properties.len(), 2);
        assert_eq!(page.page_count, 2);

        let text = render(|b| print_grid_page(b, &page));
        assert!(text.contains("Home 11  #11"));
        assert!(text.contains("Austin, TX"));
        assert!(text.contains("$120/night"));
        assert!(text.ends_with("Page 2 of 2 (12 properties)\n"));
        assert!(!text.contains("Home 10 "));
    }

    #[test]
    fn test_grid_page_json() {
        let records = vec![listing(3, "Loft")];
        let filtered: Vec<&PropertyRecord> = records.iter().collect();
        let json = serde_json::to_value(GridPage::new(&filtered, 1, 10)).unwrap();
        assert_eq!(json["total"], 1);
        assert_eq!(json["properties"][0]["hostId"], 1);
    }

    #[test]
    fn test_print_hosts() {
        let hosts = vec![
            (10, HostAggregate { sum_of_stars: 8.0, property_count: 2 }),
            (20, HostAggregate { sum_of_stars: 3.0, property_count: 1 }),
        ];
        let text = render(|b| print_hosts(b, &hosts));
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].trim_start().starts_with("10"));
        assert!(lines[1].ends_with("yes"));
        assert!(lines[2].ends_with("no"));
    }
}
