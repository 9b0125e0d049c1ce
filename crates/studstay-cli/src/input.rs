use miette::{IntoDiagnostic, Result, WrapErr};
use serde::Deserialize;
use studstay_common::{ImageNormalizer, ImageSet, Kot};

#[derive(Deserialize)]
#[serde(untagged)]
enum Rows {
    Many(Vec<Kot>),
    One(Box<Kot>),
}

/// One listing row or an array of them
pub fn parse_rows(text: &str) -> Result<Vec<Kot>> {
    let rows = serde_json::from_str::<Rows>(text)
        .into_diagnostic()
        .wrap_err("input is not a listing row or an array of listing rows")?;
    Ok(match rows {
        Rows::Many(rows) => rows,
        Rows::One(row) => vec![*row],
    })
}

/// A raw `images` field. JSON is read as a JSON value, anything else as the
/// field's text.
pub fn normalize_input(normalizer: &ImageNormalizer, text: &str) -> ImageSet {
    match serde_json::from_str::<serde_json::Value>(text) {
        Ok(value) => normalizer.normalize_json(&value),
        Err(_) => normalizer.normalize_raw(text.trim()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_row() {
        let rows = parse_rows(r#"{"id": 7, "title": "Loft", "price": 450, "images": null}"#)
            .unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].id, "7");
        assert_eq!(rows[0].title, "Loft");
    }

    #[test]
    fn array_of_rows() {
        let rows = parse_rows(
            r#"[
                {"id": "a", "title": "One", "price": 300, "images": ["/a.jpg"]},
                {"id": "b", "title": "Two", "price": 350.5}
            ]"#,
        )
        .unwrap();
        let ids: Vec<&str> = rows.iter().map(|kot| kot.id.as_str()).collect();
        assert_eq!(ids, ["a", "b"]);
        assert!(parse_rows("[]").unwrap().is_empty());
    }

    #[test]
    fn rejects_non_rows() {
        assert!(parse_rows(r#"{"title": "no id or price"}"#).is_err());
        assert!(parse_rows(r#""just text""#).is_err());
        assert!(parse_rows("not json").is_err());
    }

    #[test]
    fn json_input() {
        let n = ImageNormalizer::default();

        let images = normalize_input(&n, "null\n");
        assert!(images.is_placeholder());

        let images = normalize_input(&n, r#"["https://cdn.example/a.jpg", 3, "/b.jpg"]"#);
        assert_eq!(
            images.to_strings(),
            [
                "https://cdn.example/a.jpg",
                "https://uabrniklevoi3rnyqogs.supabase.co/b.jpg"
            ]
        );

        // JSON string holding JSON text
        let images = normalize_input(&n, r#""[\"https://cdn.example/c.jpg\"]""#);
        assert_eq!(images.to_strings(), ["https://cdn.example/c.jpg"]);
    }

    #[test]
    fn raw_text_input() {
        let n = ImageNormalizer::default();

        let images = normalize_input(&n, "https://cdn.example/a b.jpg\n");
        assert_eq!(images.to_strings(), ["https://cdn.example/a%20b.jpg"]);
        assert!(!images.is_placeholder());

        let images = normalize_input(&n, "/kot-photos/x.jpg");
        assert_eq!(
            images.first(),
            "https://uabrniklevoi3rnyqogs.supabase.co/kot-photos/x.jpg"
        );

        // broken JSON falls back to text and is unusable
        assert!(normalize_input(&n, r#"["/a.jpg""#).is_placeholder());
    }
}
