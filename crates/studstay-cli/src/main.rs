mod cli;
mod input;

use std::io::Read;
use std::path::Path;

use clap::Parser;
use miette::{IntoDiagnostic, Result, WrapErr};
use studstay_common::{ImageNormalizer, ImageSet, Kot, StorageConfig};
use tracing_subscriber::EnvFilter;

use crate::cli::{Args, Command};
use crate::input::{normalize_input, parse_rows};

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = EnvFilter::try_from_env("STUDSTAY_LOG").unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { "warn" })
    });
    tracing_subscriber::fmt()
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => {
            tracing::debug!(?path, "reading storage config");
            let text = std::fs::read_to_string(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("failed to read {}", path.display()))?;
            StorageConfig::from_kdl(&text)?
        }
        None => StorageConfig::default(),
    };
    let normalizer = ImageNormalizer::new(config);

    match args.command {
        Command::Normalize { input } => {
            let text = read_input(input.as_deref())?;
            let images = normalize_input(&normalizer, &text);
            report_placeholder(&images, "input");
            for image in &images {
                println!("{image}");
            }
        }
        Command::Listing { input, card } => {
            let text = read_input(input.as_deref())?;
            let rows = parse_rows(&text)?;
            tracing::debug!(count = rows.len(), "loaded listings");

            for kot in &rows {
                let gallery = kot.gallery(&normalizer);
                report_placeholder(&gallery, &kot.id);
                print!("{}", render_listing(kot, &gallery, card));
            }
        }
    }

    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(path)
            .into_diagnostic()
            .wrap_err_with(|| format!("failed to read {}", path.display())),
        None => {
            let mut text = String::new();
            std::io::stdin()
                .read_to_string(&mut text)
                .into_diagnostic()
                .wrap_err("failed to read stdin")?;
            Ok(text)
        }
    }
}

/// Card mode is one `title<TAB>url` line; otherwise a heading and the gallery.
fn render_listing(kot: &Kot, gallery: &ImageSet, card: bool) -> String {
    if card {
        return format!("{}\t{}\n", kot.title, gallery.first());
    }
    let mut out = format!("{} ({})\n", kot.title, kot.id);
    for image in gallery {
        out.push_str("  ");
        out.push_str(image);
        out.push('\n');
    }
    out
}

fn report_placeholder(images: &ImageSet, source: &str) {
    if images.is_placeholder() {
        tracing::warn!(source, "no usable image reference, showing placeholder");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(images: &str) -> Kot {
        input::parse_rows(&format!(
            r#"{{"id": "k1", "title": "Loft", "price": 400, "images": {images}}}"#
        ))
        .unwrap()
        .remove(0)
    }

    #[test]
    fn card_uses_the_gallery_head() {
        let n = ImageNormalizer::default();
        let kot = row(r#"["/a.jpg", "/b.jpg"]"#);
        let gallery = kot.gallery(&n);
        assert_eq!(
            render_listing(&kot, &gallery, true),
            "Loft\thttps://uabrniklevoi3rnyqogs.supabase.co/a.jpg\n"
        );
        assert_eq!(*gallery.first(), kot.card_image(&n));
    }

    #[test]
    fn card_without_images_is_flagged() {
        let n = ImageNormalizer::default();
        let kot = row("null");
        let gallery = kot.gallery(&n);
        assert!(gallery.is_placeholder());
        assert_eq!(
            render_listing(&kot, &gallery, true),
            "Loft\thttps://picsum.photos/300\n"
        );
    }

    #[test]
    fn gallery_lists_every_image() {
        let n = ImageNormalizer::default();
        let kot = row(r#"["https://cdn.example/a.jpg", "junk", "https://cdn.example/b c.jpg"]"#);
        assert_eq!(
            render_listing(&kot, &kot.gallery(&n), false),
            "Loft (k1)\n  https://cdn.example/a.jpg\n  https://cdn.example/b%20c.jpg\n"
        );
    }
}
