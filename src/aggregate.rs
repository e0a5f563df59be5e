//! Result ordering and selection.
//!
//! Pure functions over already discovered or downloaded favicons: no
//! network, no decoding.

use serde::Serialize;
use std::cmp::Reverse;

use crate::models::{Favicon, RealFavicon};

/// Anything with a size that can be ranked.
pub trait Ranked {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Whether the entry survived validation. Discovery results always have.
    fn is_valid(&self) -> bool {
        true
    }

    fn area(&self) -> u64 {
        u64::from(self.width()) * u64::from(self.height())
    }

    /// A zero dimension means the size was never determined.
    fn has_known_size(&self) -> bool {
        self.area() > 0
    }
}

impl Ranked for Favicon {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }
}

impl Ranked for RealFavicon {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn is_valid(&self) -> bool {
        self.valid
    }
}

/// Direction of the area sort. Unknown sizes go last either way.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Desc,
    Asc,
}

/// How many entries to keep after sorting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SelectionMode {
    #[default]
    All,
    /// Only the entry with the largest known area.
    Largest,
    /// Only the entry with the smallest known area.
    Smallest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregateOptions {
    pub order: SortOrder,
    pub mode: SelectionMode,
    /// Keep entries whose size is unknown (0x0).
    pub include_unknown: bool,
    /// Keep `valid = false` records.
    pub include_invalid: bool,
}

impl Default for AggregateOptions {
    fn default() -> Self {
        Self {
            order: SortOrder::Desc,
            mode: SelectionMode::All,
            include_unknown: true,
            include_invalid: true,
        }
    }
}

/// Orders results by area, largest first, unknown sizes last. Ties keep
/// their input order, so merger order decides between equal sizes.
pub fn aggregate<T: Ranked>(results: Vec<T>) -> Vec<T> {
    aggregate_with(results, &AggregateOptions::default())
}

/// `aggregate` with explicit ordering, selection and filtering.
///
/// `Largest` and `Smallest` pick among entries with a known size, the
/// first-seen one on ties; an unknown-size entry is returned only when no
/// size is known and `include_unknown` is set.
pub fn aggregate_with<T: Ranked>(results: Vec<T>, options: &AggregateOptions) -> Vec<T> {
    let (mut known, unknown): (Vec<T>, Vec<T>) = results
        .into_iter()
        .filter(|r| options.include_invalid || r.is_valid())
        .partition(|r| r.has_known_size());

    let unknown = if options.include_unknown {
        unknown
    } else {
        Vec::new()
    };

    // Selection scans merger order, so a tie goes to the first-seen entry
    // whichever way the output is sorted
    let picked = match options.mode {
        SelectionMode::All => {
            // `sort_by` is stable
            match options.order {
                SortOrder::Desc => known.sort_by(|a, b| b.area().cmp(&a.area())),
                SortOrder::Asc => known.sort_by(|a, b| a.area().cmp(&b.area())),
            }
            known.extend(unknown);
            return known;
        }
        SelectionMode::Largest => known
            .iter()
            .enumerate()
            .min_by_key(|(_, r)| Reverse(r.area())),
        SelectionMode::Smallest => known.iter().enumerate().min_by_key(|(_, r)| r.area()),
    }
    .map(|(index, _)| index);

    match picked {
        Some(index) => vec![known.swap_remove(index)],
        None => unknown.into_iter().take(1).collect(),
    }
}

/// Renders entries as JSON lines, one object per line.
pub fn to_json_lines<T: Serialize>(items: &[T]) -> Result<String, serde_json::Error> {
    let mut out = String::new();
    for item in items {
        out.push_str(&serde_json::to_string(item)?);
        out.push('\n');
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error_handling::InvalidReason;
    use crate::models::{FaviconUrl, ImageFormat, SourceKind};

    fn fav(name: &str, size: u32) -> Favicon {
        Favicon {
            absolute_url: format!("https://example.com/{name}"),
            raw_reference: name.to_string(),
            width: size,
            height: size,
            format: ImageFormat::Png,
            source_kind: SourceKind::LinkIcon,
            inline: false,
            payload: None,
        }
    }

    fn names(items: &[Favicon]) -> Vec<&str> {
        items.iter().map(|f| f.raw_reference.as_str()).collect()
    }

    #[test]
    fn test_default_order_is_descending_with_unknown_last() {
        let sorted = aggregate(vec![
            fav("unknown", 0),
            fav("small", 16),
            fav("big", 192),
            fav("mid", 32),
        ]);
        assert_eq!(names(&sorted), vec!["big", "mid", "small", "unknown"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let sorted = aggregate(vec![fav("a", 32), fav("u1", 0), fav("b", 32), fav("u2", 0)]);
        assert_eq!(names(&sorted), vec!["a", "b", "u1", "u2"]);
    }

    #[test]
    fn test_ascending_keeps_unknown_last() {
        let options = AggregateOptions {
            order: SortOrder::Asc,
            ..Default::default()
        };
        let sorted = aggregate_with(vec![fav("u", 0), fav("big", 64), fav("small", 16)], &options);
        assert_eq!(names(&sorted), vec!["small", "big", "u"]);
    }

    #[test]
    fn test_selection_modes() {
        let input = || vec![fav("u", 0), fav("mid", 32), fav("big", 64), fav("small", 16)];
        for order in [SortOrder::Desc, SortOrder::Asc] {
            let largest = aggregate_with(
                input(),
                &AggregateOptions {
                    order,
                    mode: SelectionMode::Largest,
                    ..Default::default()
                },
            );
            assert_eq!(names(&largest), vec!["big"]);

            let smallest = aggregate_with(
                input(),
                &AggregateOptions {
                    order,
                    mode: SelectionMode::Smallest,
                    ..Default::default()
                },
            );
            assert_eq!(names(&smallest), vec!["small"]);
        }
    }

    #[test]
    fn test_selection_ties_go_to_first_seen_in_either_order() {
        let input = || vec![fav("a", 32), fav("tiny", 8), fav("b", 32), fav("c", 8)];
        for order in [SortOrder::Desc, SortOrder::Asc] {
            let pick = |mode| {
                let options = AggregateOptions {
                    order,
                    mode,
                    ..Default::default()
                };
                names(&aggregate_with(input(), &options))
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            };
            assert_eq!(pick(SelectionMode::Largest), vec!["a"]);
            assert_eq!(pick(SelectionMode::Smallest), vec!["tiny"]);
        }
    }

    #[test]
    fn test_largest_falls_back_to_unknown_only_when_allowed() {
        let mut options = AggregateOptions {
            mode: SelectionMode::Largest,
            ..Default::default()
        };
        assert_eq!(names(&aggregate_with(vec![fav("u", 0)], &options)), vec!["u"]);
        options.include_unknown = false;
        assert!(aggregate_with(vec![fav("u", 0)], &options).is_empty());
    }

    #[test]
    fn test_invalid_records_can_be_filtered() {
        let ok = RealFavicon {
            url: FaviconUrl::responded("https://example.com/a", "https://example.com/a", 200),
            format: ImageFormat::Png,
            valid: true,
            invalid_reason: None,
            width: 16,
            height: 16,
            original: fav("a", 0),
            image: None,
        };
        let broken = RealFavicon::invalid(
            &fav("b", 64),
            FaviconUrl::responded("https://example.com/b", "https://example.com/b", 404),
            InvalidReason::Unreachable(404),
        );

        let all = aggregate(vec![ok.clone(), broken.clone()]);
        assert_eq!(all.len(), 2);
        assert!(!all[0].valid, "declared size still ranks invalid records");

        let options = AggregateOptions {
            include_invalid: false,
            ..Default::default()
        };
        let filtered = aggregate_with(vec![ok, broken], &options);
        assert_eq!(filtered.len(), 1);
        assert!(filtered[0].valid);
    }

    #[test]
    fn test_to_json_lines() {
        let out = to_json_lines(&[fav("a.png", 16), fav("b.png", 0)]).expect("serializable");
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 2);
        let first: serde_json::Value = serde_json::from_str(lines[0]).expect("json");
        assert_eq!(first["absolute_url"], "https://example.com/a.png");
        assert_eq!(first["width"], 16);
        assert_eq!(first["source_kind"], "link_icon");
    }
}
