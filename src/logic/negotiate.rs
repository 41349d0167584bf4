//! Accept-header content negotiation over the content types a response offers.

#[derive(Debug, Clone, PartialEq)]
struct MediaRange {
    kind: String,
    subtype: String,
    quality: f32,
}

impl MediaRange {
    /// How specifically this range matches `kind/subtype`, if at all
    fn specificity(&self, kind: &str, subtype: &str) -> Option<u8> {
        match (self.kind.as_str(), self.subtype.as_str()) {
            ("*", "*") => Some(0),
            (k, "*") if k == kind => Some(1),
            (k, s) if k == kind && s == subtype => Some(2),
            _ => None,
        }
    }
}

fn parse_accept(header: &str) -> Vec<MediaRange> {
    header
        .split(',')
        .filter_map(|entry| {
            let mut parts = entry.split(';');
            let media_type = parts.next()?.trim().to_lowercase();
            if media_type.is_empty() {
                return None;
            }
            let (kind, subtype) = split_media_type(&media_type);

            let quality = parts
                .filter_map(|param| param.split_once('='))
                .find(|(name, _)| name.trim().eq_ignore_ascii_case("q"))
                .and_then(|(_, value)| value.trim().parse::<f32>().ok())
                .map(|q| q.clamp(0.0, 1.0))
                .unwrap_or(1.0);

            Some(MediaRange {
                kind,
                subtype,
                quality,
            })
        })
        .collect()
}

fn split_media_type(media_type: &str) -> (String, String) {
    let essence = media_type.split(';').next().unwrap_or_default().trim();
    match essence.split_once('/') {
        Some((kind, subtype)) => (kind.trim().to_lowercase(), subtype.trim().to_lowercase()),
        None => (essence.to_lowercase(), String::new()),
    }
}

/// Choose the offered content type the client prefers.
///
/// Each offered type takes the quality of the most specific range that matches
/// it. The highest quality above zero wins; ties go to the more specific
/// matching range, then to the range listed first in the header, then to the
/// type offered first. A missing or blank header accepts
/// anything.
pub fn negotiate<'a, I>(accept: Option<&str>, offered: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    let ranges = match accept.map(str::trim).filter(|header| !header.is_empty()) {
        Some(header) => parse_accept(header),
        None => vec![MediaRange {
            kind: "*".to_string(),
            subtype: "*".to_string(),
            quality: 1.0,
        }],
    };

    let mut best: Option<(f32, u8, usize, usize, &'a str)> = None;
    for (offered_index, candidate) in offered.into_iter().enumerate() {
        let (kind, subtype) = split_media_type(candidate);

        let matched = ranges
            .iter()
            .enumerate()
            .filter_map(|(index, range)| {
                range
                    .specificity(&kind, &subtype)
                    .map(|specificity| (specificity, index, range.quality))
            })
            .max_by(|a, b| a.0.cmp(&b.0).then(b.1.cmp(&a.1)));

        let Some((specificity, range_index, quality)) = matched else {
            continue;
        };
        if quality <= 0.0 {
            continue;
        }

        let better = match best {
            None => true,
            Some((best_quality, best_specificity, best_range, best_offered, _)) => {
                quality > best_quality
                    || (quality == best_quality
                        && (
                            std::cmp::Reverse(specificity),
                            range_index,
                            offered_index,
                        ) < (
                            std::cmp::Reverse(best_specificity),
                            best_range,
                            best_offered,
                        ))
            }
        };
        if better {
            best = Some((quality, specificity, range_index, offered_index, candidate));
        }
    }

    best.map(|(_, _, _, _, candidate)| candidate)
}

#[cfg(test)]
mod tests {
    use super::*;

    const OFFERED: [&str; 2] = ["application/json", "application/xml"];

    #[test]
    fn test_exact_match_selects_offered_type() {
        assert_eq!(negotiate(Some("application/xml"), OFFERED), Some("application/xml"));
        assert_eq!(negotiate(Some("APPLICATION/JSON"), OFFERED), Some("application/json"));
    }

    #[test]
    fn test_missing_header_takes_first() {
        assert_eq!(negotiate(None, OFFERED), Some("application/json"));
        assert_eq!(negotiate(Some("  "), OFFERED), Some("application/json"));
    }

    #[test]
    fn test_quality_values() {
        assert_eq!(
            negotiate(Some("application/json;q=0.4, application/xml;q=0.9"), OFFERED),
            Some("application/xml")
        );
        assert_eq!(
            negotiate(Some("*/*;q=0.1, application/json;q=0"), OFFERED),
            Some("application/xml")
        );
    }

    #[test]
    fn test_wildcards() {
        assert_eq!(negotiate(Some("text/*"), ["application/json", "text/plain"]), Some("text/plain"));
        assert_eq!(negotiate(Some("*/*"), OFFERED), Some("application/json"));
    }

    #[test]
    fn test_header_order_breaks_ties() {
        assert_eq!(
            negotiate(Some("application/xml, application/json"), OFFERED),
            Some("application/xml")
        );
    }

    #[test]
    fn test_specific_range_beats_wildcard_at_equal_quality() {
        assert_eq!(
            negotiate(Some("*/*, application/xml"), OFFERED),
            Some("application/xml")
        );
        assert_eq!(
            negotiate(Some("application/*, application/xml"), OFFERED),
            Some("application/xml")
        );
        // Quality still outranks specificity
        assert_eq!(
            negotiate(Some("*/*, application/xml;q=0.5"), OFFERED),
            Some("application/json")
        );
    }

    #[test]
    fn test_no_overlap() {
        assert_eq!(negotiate(Some("text/html"), OFFERED), None);
        assert_eq!(negotiate(Some("application/json"), []), None);
    }

    #[test]
    fn test_offered_parameters_are_ignored() {
        assert_eq!(
            negotiate(Some("application/json"), ["application/json; charset=utf-8"]),
            Some("application/json; charset=utf-8")
        );
    }
}
