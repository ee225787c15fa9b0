//! Filter normalizer: raw parameter map -> [`SearchRequest`].
//!
//! Parameters are split into a fixed set of named fields and an open set of
//! dynamic attribute filters: every parameter not in [`NAMED_PARAMS`] with a
//! non-empty value becomes an attribute filter. No backend calls, no side effects.

use std::collections::BTreeMap;

use crate::config::RequestLimits;
use crate::error::ValidationError;
use crate::request::{RawParams, RawValue, SearchRequest, SortField, SortOrder};

/// Accepted spellings of the free-text parameter, in precedence order.
pub const TEXT_PARAMS: [&str; 3] = ["q", "query", "text"];
/// Accepted spellings of the page size parameter, in precedence order.
pub const PAGE_SIZE_PARAMS: [&str; 2] = ["pageSize", "limit"];

/// Every parameter that is NOT routed into attribute filters.
pub const NAMED_PARAMS: [&str; 13] = [
    "q",
    "query",
    "text",
    "category",
    "supplier",
    "brand",
    "minPrice",
    "maxPrice",
    "sortBy",
    "sortOrder",
    "page",
    "pageSize",
    "limit",
];

pub fn is_named_param(name: &str) -> bool {
    NAMED_PARAMS.contains(&name)
}

#[derive(Debug, Clone, Default)]
pub struct FilterNormalizer {
    limits: RequestLimits,
}

impl FilterNormalizer {
    pub fn new(limits: RequestLimits) -> Self {
        Self { limits }
    }

    pub fn normalize(&self, raw: &RawParams) -> Result<SearchRequest, ValidationError> {
        let mut text = String::new();
        for name in TEXT_PARAMS {
            let value = bounded_text(raw, name, self.limits.max_text_len)?;
            if text.is_empty() {
                if let Some(v) = value {
                    text = v;
                }
            }
        }

        let category = text_param(raw, "category");
        let supplier = text_param(raw, "supplier");
        let brand = bounded_text(raw, "brand", self.limits.max_brand_len)?;

        let min_price = price_param(raw, "minPrice")?;
        let max_price = price_param(raw, "maxPrice")?;
        if let (Some(min), Some(max)) = (min_price, max_price) {
            if min > max {
                return Err(ValidationError::new(
                    "minPrice",
                    format!("must be less than or equal to maxPrice ({min} > {max})"),
                ));
            }
        }

        let sort_by = match text_param(raw, "sortBy") {
            None => SortField::default(),
            Some(s) => SortField::parse(&s).ok_or_else(|| {
                let allowed: Vec<&str> = SortField::ALL.iter().map(SortField::as_str).collect();
                ValidationError::new("sortBy", format!("must be one of [{}]", allowed.join(", ")))
            })?,
        };
        let sort_order = match text_param(raw, "sortOrder") {
            None => SortOrder::default(),
            Some(s) => SortOrder::parse(&s)
                .ok_or_else(|| ValidationError::new("sortOrder", "must be one of [asc, desc]"))?,
        };

        let page = match integer_param(raw, "page")? {
            None => 1,
            Some(p) if p < 1 => {
                return Err(ValidationError::new("page", "must be greater than or equal to 1"));
            }
            Some(p) => u32::try_from(p)
                .map_err(|_| ValidationError::new("page", format!("must be at most {}", u32::MAX)))?,
        };

        let mut page_size = None;
        for name in PAGE_SIZE_PARAMS {
            let Some(size) = integer_param(raw, name)? else {
                continue;
            };
            if size < 1 || size > i64::from(self.limits.max_page_size) {
                return Err(ValidationError::new(
                    name,
                    format!("must be between 1 and {}", self.limits.max_page_size),
                ));
            }
            page_size.get_or_insert(size as u32);
        }
        let page_size = page_size.unwrap_or(self.limits.default_page_size);

        // Names are matched trimmed; an exactly spelled key beats a padded duplicate.
        let mut attribute_filters = BTreeMap::new();
        for (raw_name, value) in raw {
            let name = raw_name.trim();
            if name.is_empty() || is_named_param(name) {
                continue;
            }
            if name != raw_name && raw.contains_key(name) {
                continue;
            }
            if let Some(value) = value_as_text(value) {
                attribute_filters.entry(name.to_string()).or_insert(value);
            }
        }

        Ok(SearchRequest {
            text,
            category,
            supplier,
            brand,
            min_price,
            max_price,
            sort_by,
            sort_order,
            page,
            page_size,
            attribute_filters,
        })
    }
}

/// Trimmed string form of a value; `None` when blank.
fn value_as_text(value: &RawValue) -> Option<String> {
    let text = match value {
        RawValue::Text(s) => s.trim().to_string(),
        RawValue::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => format!("{}", *n as i64),
        RawValue::Number(n) => n.to_string(),
    };
    (!text.is_empty()).then_some(text)
}

fn text_param(raw: &RawParams, name: &str) -> Option<String> {
    raw.get(name).and_then(value_as_text)
}

fn bounded_text(raw: &RawParams, name: &str, max: usize) -> Result<Option<String>, ValidationError> {
    match text_param(raw, name) {
        Some(v) if v.chars().count() > max => Err(ValidationError::new(
            name,
            format!("length must be less than or equal to {max} characters"),
        )),
        other => Ok(other),
    }
}

fn number_param(raw: &RawParams, name: &str) -> Result<Option<f64>, ValidationError> {
    let n = match raw.get(name) {
        None => return Ok(None),
        Some(RawValue::Number(n)) => *n,
        Some(RawValue::Text(s)) => {
            let s = s.trim();
            if s.is_empty() {
                return Ok(None);
            }
            s.parse::<f64>()
                .map_err(|_| ValidationError::new(name, format!("must be a number, got {s:?}")))?
        }
    };
    if !n.is_finite() {
        return Err(ValidationError::new(name, "must be a finite number"));
    }
    Ok(Some(n))
}

fn price_param(raw: &RawParams, name: &str) -> Result<Option<f64>, ValidationError> {
    match number_param(raw, name)? {
        Some(p) if p < 0.0 => Err(ValidationError::new(name, "must be greater than or equal to 0")),
        other => Ok(other),
    }
}

fn integer_param(raw: &RawParams, name: &str) -> Result<Option<i64>, ValidationError> {
    match number_param(raw, name)? {
        None => Ok(None),
        Some(n) if n.fract() != 0.0 => Err(ValidationError::new(name, "must be an integer")),
        Some(n) if n.abs() > 9.0e15 => Err(ValidationError::new(name, "is out of range")),
        Some(n) => Ok(Some(n as i64)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), RawValue::from(*v)))
            .collect()
    }

    fn normalize(pairs: &[(&str, &str)]) -> Result<SearchRequest, ValidationError> {
        FilterNormalizer::default().normalize(&params(pairs))
    }

    #[test]
    fn empty_params_yield_defaults() {
        let req = normalize(&[]).unwrap();
        assert_eq!(req, SearchRequest::default());
        assert!(!req.has_text());
    }

    #[test]
    fn named_fields_are_trimmed_and_typed() {
        let req = normalize(&[
            ("q", "  t-shirt "),
            ("category", " fashion_1 "),
            ("supplier", "sup_1"),
            ("brand", " ComfortWear "),
            ("minPrice", "20"),
            ("maxPrice", "50.5"),
            ("sortBy", "price"),
            ("sortOrder", "asc"),
            ("page", "3"),
            ("limit", "10"),
        ])
        .unwrap();

        assert_eq!(req.text, "t-shirt");
        assert_eq!(req.category.as_deref(), Some("fashion_1"));
        assert_eq!(req.supplier.as_deref(), Some("sup_1"));
        assert_eq!(req.brand.as_deref(), Some("ComfortWear"));
        assert_eq!(req.min_price, Some(20.0));
        assert_eq!(req.max_price, Some(50.5));
        assert_eq!(req.sort_by, SortField::Price);
        assert_eq!(req.sort_order, SortOrder::Ascending);
        assert_eq!(req.page, 3);
        assert_eq!(req.page_size, 10);
        assert!(req.attribute_filters.is_empty());
    }

    #[test]
    fn unknown_params_become_attribute_filters() {
        let req = normalize(&[("neckType", " V-Neck "), ("color", "Red"), ("size", "   ")]).unwrap();
        assert_eq!(req.attribute_filters.len(), 2);
        assert_eq!(req.attribute_filters["neckType"], "V-Neck");
        assert_eq!(req.attribute_filters["color"], "Red");
    }

    #[test]
    fn numeric_attribute_values_are_stringified() {
        let mut raw = params(&[]);
        raw.insert("storage".to_string(), RawValue::Number(128.0));
        raw.insert("screen".to_string(), RawValue::Number(6.7));
        let req = FilterNormalizer::default().normalize(&raw).unwrap();
        assert_eq!(req.attribute_filters["storage"], "128");
        assert_eq!(req.attribute_filters["screen"], "6.7");
    }

    #[test]
    fn padded_names_are_trimmed_before_routing() {
        let req = normalize(&[(" page", "7"), (" color", "Blue"), ("color", "Red"), ("size ", "M")]).unwrap();
        assert_eq!(req.page, 1);
        assert_eq!(req.attribute_filters.len(), 2);
        assert_eq!(req.attribute_filters["color"], "Red");
        assert_eq!(req.attribute_filters["size"], "M");
        assert!(!req.attribute_filters.contains_key("page"));
    }

    #[test]
    fn text_aliases_follow_precedence() {
        assert_eq!(normalize(&[("query", "b"), ("q", "a")]).unwrap().text, "a");
        assert_eq!(normalize(&[("query", "b"), ("q", "  ")]).unwrap().text, "b");
        assert_eq!(normalize(&[("text", "c")]).unwrap().text, "c");
        assert!(normalize(&[("q", "x"), ("query", "y")]).unwrap().attribute_filters.is_empty());
    }

    #[test]
    fn page_size_prefers_page_size_over_limit() {
        assert_eq!(normalize(&[("pageSize", "5"), ("limit", "7")]).unwrap().page_size, 5);
        assert_eq!(normalize(&[("limit", "7")]).unwrap().page_size, 7);
    }

    #[test]
    fn min_greater_than_max_is_rejected() {
        let err = normalize(&[("maxPrice", "10"), ("minPrice", "20")]).unwrap_err();
        assert_eq!(err.field, "minPrice");
    }

    #[test]
    fn out_of_range_values_name_the_field() {
        let cases: &[(&[(&str, &str)], &str)] = &[
            (&[("minPrice", "-1")], "minPrice"),
            (&[("maxPrice", "abc")], "maxPrice"),
            (&[("page", "0")], "page"),
            (&[("page", "1.5")], "page"),
            (&[("pageSize", "101")], "pageSize"),
            (&[("limit", "0")], "limit"),
            (&[("sortBy", "relevance")], "sortBy"),
            (&[("sortOrder", "sideways")], "sortOrder"),
        ];
        for (pairs, field) in cases {
            let err = normalize(pairs).unwrap_err();
            assert_eq!(&err.field, field, "for {pairs:?}");
        }
    }

    #[test]
    fn text_and_brand_are_length_capped() {
        let long = "x".repeat(201);
        assert_eq!(normalize(&[("q", &long)]).unwrap_err().field, "q");
        assert!(normalize(&[("q", &"x".repeat(200))]).is_ok());

        let brand = "b".repeat(101);
        assert_eq!(normalize(&[("brand", &brand)]).unwrap_err().field, "brand");
    }

    #[test]
    fn numeric_raw_values_are_accepted_for_named_fields() {
        let mut raw = RawParams::new();
        raw.insert("page".to_string(), RawValue::Number(2.0));
        raw.insert("pageSize".to_string(), RawValue::Number(50.0));
        raw.insert("minPrice".to_string(), RawValue::Number(9.99));
        let req = FilterNormalizer::default().normalize(&raw).unwrap();
        assert_eq!((req.page, req.page_size, req.min_price), (2, 50, Some(9.99)));
    }

    proptest! {
        #![proptest_config(ProptestConfig {
            cases: 256,
            ..ProptestConfig::default()
        })]

        /// Property: attribute filters are exactly the non-named, non-blank parameters.
        #[test]
        fn attribute_filters_are_params_minus_named(
            extra in prop::collection::btree_map("[a-zA-Z][a-zA-Z0-9_]{0,11}", "[A-Za-z0-9 -]{0,12}", 0..8)
        ) {
            let extra: BTreeMap<String, String> = extra
                .into_iter()
                .filter(|(k, _)| !is_named_param(k))
                .collect();
            let mut raw: RawParams = extra
                .iter()
                .map(|(k, v)| (k.clone(), RawValue::Text(v.clone())))
                .collect();
            raw.insert("q".to_string(), RawValue::from("shirt"));
            raw.insert("page".to_string(), RawValue::from("1"));

            let req = FilterNormalizer::default().normalize(&raw).unwrap();

            let expected: BTreeMap<String, String> = extra
                .into_iter()
                .filter(|(_, v)| !v.trim().is_empty())
                .map(|(k, v)| (k, v.trim().to_string()))
                .collect();
            prop_assert_eq!(req.attribute_filters, expected);
        }
    }
}
