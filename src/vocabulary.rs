//! Controlled vocabulary of the 17 top-level statistical fields.
//!
//! Display order is fixed by this table. Values outside it are kept and placed
//! after every known field, in the order they were first seen.

use polars::prelude::*;

use crate::schema::ranking;

pub const FIELD_ORDER: [&str; 17] = [
    "国土・気象",
    "人口・世帯",
    "労働・賃金",
    "農林水産業",
    "鉱工業",
    "商業・サービス業",
    "企業・家計・経済",
    "住宅・土地・建設",
    "エネルギー・水",
    "運輸・観光",
    "情報通信・科学技術",
    "教育・文化・スポーツ・生活",
    "行財政",
    "司法・安全・環境",
    "社会保障・衛生",
    "国際",
    "その他",
];

/// Field preselected by the field analysis page when present.
pub const DEFAULT_FIELD: &str = "人口・世帯";

/// Position of `name` in the display order, `None` when out of vocabulary.
pub fn field_position(name: &str) -> Option<usize> {
    FIELD_ORDER.iter().position(|f| *f == name)
}

/// Sort key: vocabulary position, or one past the end for unknown values.
pub fn field_sort_key(name: &str) -> usize {
    field_position(name).unwrap_or(FIELD_ORDER.len())
}

/// Deduplicate `names` and order them for display.
pub fn order_fields<I, S>(names: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut seen: Vec<String> = Vec::new();
    for name in names {
        let name = name.as_ref();
        if !seen.iter().any(|s| s == name) {
            seen.push(name.to_string());
        }
    }
    // sort_by_key is stable: unknown fields keep first-seen order
    seen.sort_by_key(|s| field_sort_key(s));
    seen
}

/// Expression mapping the `field_major` column to its display position.
/// Null and out-of-vocabulary values map to `FIELD_ORDER.len()`.
pub fn field_order_expr() -> Expr {
    FIELD_ORDER
        .iter()
        .enumerate()
        .rev()
        .fold(lit(FIELD_ORDER.len() as u32), |acc, (i, name)| {
            when(col(ranking::FIELD_MAJOR).eq(lit(*name)))
                .then(lit(i as u32))
                .otherwise(acc)
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vocabulary_has_seventeen_distinct_fields() {
        let ordered = order_fields(FIELD_ORDER);
        assert_eq!(ordered.len(), 17);
        assert_eq!(ordered[0], "国土・気象");
        assert_eq!(ordered[16], "その他");
    }

    #[test]
    fn test_unknown_fields_append_in_first_seen_order() {
        let ordered = order_fields(["zeta", "その他", "alpha", "国土・気象", "zeta"]);
        assert_eq!(ordered, vec!["国土・気象", "その他", "zeta", "alpha"]);
    }

    #[test]
    fn test_field_position() {
        assert_eq!(field_position("人口・世帯"), Some(1));
        assert_eq!(field_position("unknown"), None);
        assert_eq!(field_sort_key("unknown"), 17);
    }
}
