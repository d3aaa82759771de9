use clap::Parser;
use pdf_outline::outline::{assign_levels, collect_candidates, is_heading_text};
use pdf_outline::styles::BodyZone;
use pdf_outline::{load_source, profile_styles, OutlineConfig};
use std::path::PathBuf;

/// Dump extracted blocks, lines and spans with their styles
#[derive(Parser)]
#[command(name = "debug_spans")]
struct Args {
    pdf_path: PathBuf,

    /// Page range, e.g. "3" (pages 1-3) or "2-5"
    #[arg(default_value = "1-3")]
    range: String,
}

fn main() {
    env_logger::init();
    let args = Args::parse();

    let (min_page, max_page) = if let Some((a, b)) = args.range.split_once('-') {
        (a.parse().unwrap_or(1), b.parse().unwrap_or(3))
    } else {
        (1, args.range.parse().unwrap_or(3))
    };

    let doc = match load_source(&args.pdf_path) {
        Ok(doc) => doc,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = OutlineConfig::default();
    let profile = profile_styles(&doc, &config);
    println!("Body style: {:?}", profile.body_style());
    println!("Styles: {:?}", profile.ranked_styles());
    if let Some(body) = profile.body_style() {
        let candidates = collect_candidates(&doc, &body, &config);
        let mut levels: Vec<_> = assign_levels(&candidates, config.heading_levels())
            .into_iter()
            .collect();
        levels.sort_by_key(|(_, level)| *level);
        for (style, level) in levels {
            println!("  {} <- {:?}", level, style);
        }
    }
    println!("Bookmarks: {}", doc.toc.len());
    println!();

    for (idx, page) in doc.pages.iter().enumerate() {
        let page_num = idx + 1;
        if page_num < min_page || page_num > max_page {
            continue;
        }

        let zone = BodyZone::for_page(page, &config);
        println!(
            "=== PAGE {} (height {:.1}, body zone {:.1}..{:.1}, {} blocks) ===",
            page_num,
            page.height,
            zone.top,
            zone.bottom,
            page.blocks.len()
        );
        for block in &page.blocks {
            let b = block.bbox;
            println!(
                "  block [{:7.1} {:7.1} {:7.1} {:7.1}] {}",
                b.x0,
                b.y0,
                b.x1,
                b.y1,
                if zone.contains(&b) { "body" } else { "margin" }
            );
            for line in &block.lines {
                let text = line.text();
                println!(
                    "    line {:?} heading_text={} {:?}",
                    line.style(),
                    is_heading_text(&text, &config),
                    text
                );
                for span in &line.spans {
                    println!(
                        "      fs={:5.1} bold={} font={} text={:?}",
                        span.size, span.bold, span.font, span.text
                    );
                }
            }
        }
        println!();
    }
}
