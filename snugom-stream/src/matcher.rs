//! In-memory evaluation of a query tree against JSON documents.
//!
//! Documents are objects keyed by field alias, shaped the way the engine
//! indexes them: text and tag fields as strings (tags may also be arrays),
//! numbers and dates (epoch milliseconds) as JSON numbers, booleans as JSON
//! booleans, geo points as `"lon,lat"` strings and vectors as number arrays.
//! Useful for dry runs and for checking what a compiled stream selects.

use std::cmp::Ordering;

use serde_json::Value as JsonValue;

use crate::codec::{GeoRadius, KnnClause, TagMode, TermValue, TextMode};
use crate::field::DistanceMetric;
use crate::query::{QueryNode, QueryTree};

/// Mean earth radius used by the engine for geo distances, in meters.
const EARTH_RADIUS_METERS: f64 = 6_372_797.560_856;

/// Whether `doc` satisfies the tree's filter. For a k-NN tree this checks the
/// filter and the distance threshold; ranking needs the whole set, see [`select`].
pub fn matches(tree: &QueryTree, doc: &JsonValue) -> bool {
    match tree.node() {
        QueryNode::Root => true,
        QueryNode::Term(term) => term_matches(&term.alias, &term.value, doc),
        QueryNode::Intersect { children } => children.iter().all(|child| matches(child, doc)),
        QueryNode::Union { alias, alternatives } => alternatives.iter().any(|value| term_matches(alias, value, doc)),
        QueryNode::NegatedUnion { alias, alternatives } => {
            !alternatives.iter().any(|value| term_matches(alias, value, doc))
        }
        QueryNode::Knn { filter, clause } => {
            matches(filter, doc)
                && match clause.threshold {
                    Some(threshold) => distance(clause, doc).is_some_and(|distance| distance <= threshold),
                    None => true,
                }
        }
    }
}

/// Documents the tree selects, in order. k-NN trees return at most `k`
/// documents, closest first; documents without a vector are skipped.
pub fn select<'d>(tree: &QueryTree, docs: &'d [JsonValue]) -> Vec<&'d JsonValue> {
    let Some(clause) = tree.knn_clause() else {
        return docs.iter().filter(|doc| matches(tree, doc)).collect();
    };

    let mut ranked: Vec<(f64, &JsonValue)> = docs
        .iter()
        .filter(|doc| matches(tree, doc))
        .filter_map(|doc| distance(clause, doc).map(|distance| (distance, doc)))
        .collect();
    ranked.sort_by(|left, right| left.0.partial_cmp(&right.0).unwrap_or(Ordering::Equal));
    ranked.into_iter().take(clause.k).map(|(_, doc)| doc).collect()
}

fn term_matches(alias: &str, value: &TermValue, doc: &JsonValue) -> bool {
    let field = doc.get(alias).filter(|field| !field.is_null());
    match value {
        TermValue::Missing => field.is_none(),
        TermValue::Text { mode, value } => field.and_then(JsonValue::as_str).is_some_and(|text| text_matches(*mode, value, text)),
        TermValue::Tag { mode, value } => field.is_some_and(|field| tags_of(field).iter().any(|tag| tag_matches(*mode, value, tag))),
        TermValue::Numeric(range) => field.and_then(number_of).is_some_and(|number| range.contains(number)),
        TermValue::Geo(geo) => field.and_then(point_of).is_some_and(|point| within(geo, point)),
    }
}

fn tokens(text: &str) -> Vec<String> {
    text.split(|ch: char| !ch.is_alphanumeric() && ch != '_')
        .filter(|token| !token.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn text_matches(mode: TextMode, needle: &str, text: &str) -> bool {
    let haystack = tokens(text);
    let wanted = tokens(needle);
    if wanted.is_empty() {
        // Nothing to look for: the engine treats a bare wildcard as match-all.
        return mode != TextMode::Exact;
    }
    let last = wanted.len() - 1;

    match mode {
        TextMode::Exact => haystack.windows(wanted.len()).any(|window| window == wanted.as_slice()),
        // Multi-token patterns are conjunctions: each token must hit some indexed token.
        TextMode::Prefix => wanted.iter().enumerate().all(|(index, want)| {
            if index == last {
                any_token(&haystack, |token| token.starts_with(want.as_str()))
            } else {
                any_token(&haystack, |token| token == want.as_str())
            }
        }),
        TextMode::Suffix => wanted.iter().enumerate().all(|(index, want)| {
            if index == 0 {
                any_token(&haystack, |token| token.ends_with(want.as_str()))
            } else {
                any_token(&haystack, |token| token == want.as_str())
            }
        }),
        TextMode::Contains => wanted.iter().all(|want| any_token(&haystack, |token| token.contains(want.as_str()))),
        TextMode::Fuzzy => wanted.iter().all(|want| any_token(&haystack, |token| levenshtein(token, want) <= 1)),
    }
}

fn any_token(haystack: &[String], test: impl Fn(&str) -> bool) -> bool {
    haystack.iter().any(|token| test(token.as_str()))
}

fn tags_of(field: &JsonValue) -> Vec<String> {
    match field {
        JsonValue::String(text) => text.split(',').map(|tag| tag.trim().to_lowercase()).collect(),
        JsonValue::Array(items) => items.iter().flat_map(tags_of).collect(),
        JsonValue::Bool(flag) => vec![flag.to_string()],
        JsonValue::Number(number) => vec![number.to_string()],
        JsonValue::Null | JsonValue::Object(_) => Vec::new(),
    }
}

fn tag_matches(mode: TagMode, wanted: &str, tag: &str) -> bool {
    let wanted = wanted.to_lowercase();
    match mode {
        TagMode::Exact => tag == wanted,
        TagMode::Prefix => tag.starts_with(&wanted),
        TagMode::Suffix => tag.ends_with(&wanted),
        TagMode::Contains => tag.contains(&wanted),
    }
}

fn number_of(field: &JsonValue) -> Option<f64> {
    match field {
        JsonValue::Number(number) => number.as_f64(),
        JsonValue::String(text) => text.trim().parse().ok(),
        _ => None,
    }
}

/// `"lon,lat"`, `[lon, lat]` or `{"lon": .., "lat": ..}`.
fn point_of(field: &JsonValue) -> Option<(f64, f64)> {
    match field {
        JsonValue::String(text) => {
            let (lon, lat) = text.split_once(',')?;
            Some((lon.trim().parse().ok()?, lat.trim().parse().ok()?))
        }
        JsonValue::Array(items) => match items.as_slice() {
            [lon, lat] => Some((lon.as_f64()?, lat.as_f64()?)),
            _ => None,
        },
        JsonValue::Object(map) => Some((map.get("lon")?.as_f64()?, map.get("lat")?.as_f64()?)),
        _ => None,
    }
}

fn within(geo: &GeoRadius, (lon, lat): (f64, f64)) -> bool {
    haversine_meters(geo.center.lon, geo.center.lat, lon, lat) <= geo.radius_meters()
}

fn haversine_meters(lon1: f64, lat1: f64, lon2: f64, lat2: f64) -> f64 {
    let (phi1, phi2) = (lat1.to_radians(), lat2.to_radians());
    let d_phi = (lat2 - lat1).to_radians();
    let d_lambda = (lon2 - lon1).to_radians();
    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_METERS * a.sqrt().asin()
}

fn levenshtein(left: &str, right: &str) -> usize {
    let right: Vec<char> = right.chars().collect();
    let mut previous: Vec<usize> = (0..=right.len()).collect();
    for (i, lc) in left.chars().enumerate() {
        let mut current = vec![i + 1; right.len() + 1];
        for (j, rc) in right.iter().enumerate() {
            let substitution = previous[j] + usize::from(lc != *rc);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        previous = current;
    }
    previous[right.len()]
}

/// Distance as the engine reports it: squared L2, `1 - dot` for IP and `1 - cos` for COSINE.
fn distance(clause: &KnnClause, doc: &JsonValue) -> Option<f64> {
    let stored: Vec<f64> = doc
        .get(&clause.alias)?
        .as_array()?
        .iter()
        .map(JsonValue::as_f64)
        .collect::<Option<_>>()?;
    if stored.len() != clause.vector.len() {
        return None;
    }

    let query = clause.vector.iter().map(|component| f64::from(*component));
    let distance = match clause.metric {
        DistanceMetric::L2 => query.zip(&stored).map(|(a, b)| (a - b).powi(2)).sum::<f64>(),
        DistanceMetric::Ip => 1.0 - query.zip(&stored).map(|(a, b)| a * b).sum::<f64>(),
        DistanceMetric::Cosine => {
            let query: Vec<f64> = query.collect();
            let dot: f64 = query.iter().zip(&stored).map(|(a, b)| a * b).sum();
            let norm = query.iter().map(|a| a * a).sum::<f64>().sqrt() * stored.iter().map(|b| b * b).sum::<f64>().sqrt();
            if norm == 0.0 {
                return None;
            }
            1.0 - dot / norm
        }
    };
    Some(distance)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::codec::GeoUnit;
    use crate::field::{FieldDescriptor, VectorParams};
    use crate::predicate::Apply;
    use crate::value::{GeoPoint, list};
    use serde_json::json;

    fn people() -> Vec<JsonValue> {
        vec![
            json!({"id": "1", "name": "Alice Smith", "age": 30, "tags": "admin,ops", "active": true, "location": "2.35,48.85"}),
            json!({"id": "2", "name": "Bob", "age": 17, "tags": ["dev"], "active": false, "location": "-0.12,51.50"}),
            json!({"id": "3", "name": "Carol-Ann", "age": 66, "active": true}),
        ]
    }

    fn ids(docs: Vec<&JsonValue>) -> Vec<&str> {
        docs.into_iter().filter_map(|doc| doc["id"].as_str()).collect()
    }

    #[test]
    fn root_selects_everything() {
        assert_eq!(select(&QueryTree::root(), &people()).len(), 3);
    }

    #[test]
    fn text_modes() {
        let name = FieldDescriptor::text("name").unwrap();
        let docs = people();
        let cases = [
            (name.equal("alice smith").unwrap(), vec!["1"]),
            (name.starts_with("car").unwrap(), vec!["3"]),
            (name.ends_with("ith").unwrap(), vec!["1"]),
            (name.containing("li").unwrap(), vec!["1"]),
            (name.like("bop").unwrap(), vec!["2"]),
        ];
        for (predicate, expected) in cases {
            assert_eq!(ids(select(&predicate.apply(&QueryTree::root()), &docs)), expected);
        }
    }

    #[test]
    fn multi_word_patterns_need_every_token() {
        let name = FieldDescriptor::text("name").unwrap();
        let docs = [
            json!({"id": "a", "name": "Jon Smith"}),
            json!({"id": "b", "name": "Jon Doe"}),
            json!({"id": "c", "name": "Van Dyke"}),
        ];
        let cases = [
            (name.like("jon smth").unwrap(), vec!["a"]),
            (name.containing("on mit").unwrap(), vec!["a"]),
            (name.ends_with("an dyke").unwrap(), vec!["c"]),
            (name.starts_with("jon d").unwrap(), vec!["b"]),
        ];
        for (predicate, expected) in cases {
            assert_eq!(ids(select(&predicate.apply(&QueryTree::root()), &docs)), expected);
        }
    }

    #[test]
    fn tags_and_booleans() {
        let tags = FieldDescriptor::tag("tags").unwrap();
        let active = FieldDescriptor::boolean("active").unwrap();
        let docs = people();

        let tree = tags.in_values(list(["OPS", "dev"])).unwrap().apply(&QueryTree::root());
        assert_eq!(ids(select(&tree, &docs)), ["1", "2"]);

        let tree = active.is_false().unwrap().apply(&QueryTree::root());
        assert_eq!(ids(select(&tree, &docs)), ["2"]);
    }

    #[test]
    fn missing_and_negation() {
        let tags = FieldDescriptor::tag("tags").unwrap();
        let docs = people();
        let tree = tags.is_missing().unwrap().apply(&QueryTree::root());
        assert_eq!(ids(select(&tree, &docs)), ["3"]);

        let tree = tags.not_equal("dev").unwrap().apply(&QueryTree::root());
        assert_eq!(ids(select(&tree, &docs)), ["1", "3"]);
    }

    #[test]
    fn geo_radius() {
        let location = FieldDescriptor::geo("location").unwrap();
        let tree = location
            .near(GeoPoint::new(2.29, 48.86), 10.0, GeoUnit::Km)
            .unwrap()
            .apply(&QueryTree::root());
        assert_eq!(ids(select(&tree, &people())), ["1"]);
    }

    #[test]
    fn levenshtein_distance() {
        assert_eq!(levenshtein("kitten", "sitting"), 3);
        assert_eq!(levenshtein("", "ab"), 2);
        assert_eq!(levenshtein("same", "same"), 0);
    }

    #[test]
    fn knn_ranks_and_truncates() {
        let embedding = FieldDescriptor::vector("embedding", "embedding", VectorParams::new(2, DistanceMetric::L2)).unwrap();
        let docs = vec![
            json!({"id": "far", "embedding": [10.0, 10.0]}),
            json!({"id": "near", "embedding": [1.0, 0.0]}),
            json!({"id": "mid", "embedding": [2.0, 2.0]}),
            json!({"id": "none"}),
        ];

        let tree = embedding.knn(vec![1.0_f32, 0.0], 2).unwrap().apply(&QueryTree::root());
        assert_eq!(ids(select(&tree, &docs)), ["near", "mid"]);

        let tree = embedding
            .knn_within(vec![1.0_f32, 0.0], 3, 4.0)
            .unwrap()
            .apply(&QueryTree::root());
        assert_eq!(ids(select(&tree, &docs)), ["near"]);
    }

    #[test]
    fn cosine_distance_ignores_magnitude() {
        let embedding =
            FieldDescriptor::vector("embedding", "embedding", VectorParams::new(2, DistanceMetric::Cosine)).unwrap();
        let predicate = embedding.knn(vec![2.0_f32, 0.0], 1).unwrap();
        let crate::predicate::Criterion::Nearest(clause) = predicate.criterion() else {
            panic!("expected a k-NN criterion");
        };
        let distance = distance(clause, &json!({"embedding": [5.0, 0.0]})).unwrap();
        assert!(distance.abs() < 1e-9);
    }
}
