//! View constructors. Each takes already-resolved data and returns a tree;
//! none of them navigate or perform I/O.

use crate::catalog::{Catalog, Series};
use crate::config::SiteConfig;
use crate::node::{Node, el};
use crate::reader::{Navigator, Position};
use crate::route::Route;

const UNKNOWN_AUTHOR: &str = "Unknown author";

pub fn home(config: &SiteConfig, catalog: &Catalog) -> Node {
    if catalog.series.is_empty() {
        return el("div").class("empty").child("The catalog is empty").into();
    }

    let cards = catalog.series.iter().map(|series| {
        el("a")
            .attr("href", Route::Series { id: series.id.clone() }.fragment())
            .class("card")
            .child(
                el("div").class("card-media").child(
                    el("img")
                        .attr("src", config.asset_url(&series.cover))
                        .attr("alt", series.title.as_str())
                        .attr("loading", "lazy"),
                ),
            )
            .child(
                el("div")
                    .class("card-body")
                    .child(el("div").class("card-title").child(series.title.as_str()))
                    .child(el("div").class("card-meta").child(format!(
                        "{} • {} chapters",
                        series.author_or(UNKNOWN_AUTHOR),
                        series.chapters.len()
                    ))),
            )
    });

    el("section")
        .child(section_title("Catalog", "Strict and concise"))
        .child(el("div").class("grid").children(cards))
        .into()
}

pub fn series(series: &Series) -> Node {
    let rows = series.chapters.iter().enumerate().map(|(index, chapter)| {
        let target = Route::Read {
            series_id: series.id.clone(),
            chapter: i64::try_from(index).unwrap_or(i64::MAX),
            page: 0,
        };
        el("a")
            .class("list-row")
            .attr("href", target.fragment())
            .child(el("div").child(chapter.name.as_str()))
            .child(el("div").class("pill").child(format!("{} pages", chapter.pages.len())))
    });

    let info = el("div").class("kv").child(
        el("div")
            .child(el("div").class("k").child("Author"))
            .child(el("div").child(series.author_or("—"))),
    );

    el("section")
        .child(section_title(
            &series.title,
            &format!("{} chapters", series.chapters.len()),
        ))
        .child(info)
        .child(el("div").class("list").children(rows))
        .into()
}

/// The reader page. `nav` must have been clamped against `series`.
pub fn reader(config: &SiteConfig, series: &Series, nav: &Navigator, width: i64) -> Node {
    let at = nav.position();
    let chapter = &series.chapters[at.chapter];
    let page_number = at.page + 1;
    let total = chapter.pages.len();
    let goto = |target: Option<Position>| {
        target.map(|position| Route::read(&series.id, position).fragment())
    };

    let topbar = el("div")
        .class("reader-topbar")
        .child(
            el("div")
                .class("row gap-md")
                .child(
                    el("a")
                        .class("btn ghost")
                        .attr("href", Route::Series { id: series.id.clone() }.fragment())
                        .child("⟵ Back"),
                )
                .child(
                    el("div")
                        .class("reader-info")
                        .child(el("strong").child(series.title.as_str()))
                        .child(format!(
                            " · {} · page {page_number} / {total}",
                            chapter.name
                        )),
                ),
        )
        .child(
            el("div")
                .class("row gap-sm")
                .child(
                    el("button")
                        .class("btn")
                        .attr_opt("data-goto", goto(nav.prev_page()))
                        .attr("title", "Previous (←)")
                        .child("←"),
                )
                .child(
                    el("button")
                        .class("btn teal")
                        .attr_opt("data-goto", goto(nav.next_page()))
                        .attr("title", "Next (→)")
                        .child("→"),
                )
                .child(el("span").class("pill").child(format!("Width: {width}px"))),
        );

    let image = el("img")
        .class("page-img")
        .attr("src", config.asset_url(&chapter.pages[at.page]))
        .attr(
            "alt",
            format!("{} — {} — page {page_number}", series.title, chapter.name),
        );

    el("section")
        .class("reader")
        .child(topbar)
        .child(el("div").class("reader-canvas").child(image))
        .into()
}

pub fn about() -> Node {
    let shortcut = |parts: Vec<Node>| el("div").children(parts);
    let kbd = |key: &str| -> Node { el("kbd").child(key).into() };

    let legend = el("div")
        .child(shortcut(vec![
            kbd("←"),
            " / ".into(),
            kbd("→"),
            " — turn pages".into(),
        ]))
        .child(shortcut(vec![
            "Shift + ".into(),
            kbd("←"),
            " / Shift + ".into(),
            kbd("→"),
            " — chapters".into(),
        ]))
        .child(shortcut(vec![
            kbd("+"),
            " / ".into(),
            kbd("−"),
            " — canvas width".into(),
        ]));

    el("div")
        .child(section_title("About", "A minimalist manga reader"))
        .child(
            el("div").class("kv").child(
                el("div")
                    .child(el("div").class("k").child("Keyboard shortcuts"))
                    .child(legend),
            ),
        )
        .into()
}

pub fn not_found() -> Node {
    el("div").class("empty").child("Page not found").into()
}

pub fn failure(message: &str) -> Node {
    el("div")
        .class("empty")
        .child(format!("Error: {message}"))
        .into()
}

fn section_title(title: &str, subtitle: &str) -> Node {
    el("div")
        .class("section-title")
        .child(el("h2").child(title))
        .child(el("span").class("sub").child(subtitle))
        .into()
}
