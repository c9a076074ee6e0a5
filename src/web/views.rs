// HTML rendering for the gallery page.

use crate::{models::ImageRecord, pagination::Page};
use maud::{DOCTYPE, Markup, html};

const CSS: &str = "\
body{font-family:system-ui,sans-serif;margin:0 auto;max-width:960px;padding:1rem;}\
.upload-form{display:flex;gap:.5rem;flex-wrap:wrap;margin-bottom:1.5rem;}\
.gallery-grid{display:grid;grid-template-columns:repeat(auto-fill,minmax(280px,1fr));gap:1rem;}\
.gallery-item{margin:0;}\
.gallery-item img{width:100%;height:220px;object-fit:cover;border-radius:4px;}\
.pagination{display:flex;gap:.5rem;justify-content:center;margin-top:1.5rem;}\
.pagination .current{font-weight:bold;}";

/// Renders the base HTML document structure
fn base_document(title: &str, content: Markup) -> Markup {
    html! {
        (DOCTYPE)
        html lang="en" {
            head {
                meta charset="UTF-8";
                meta name="viewport" content="width=device-width, initial-scale=1.0";
                title { (title) }
                style { (CSS) }
            }
            body {
                (content)
            }
        }
    }
}

fn upload_form() -> Markup {
    html! {
        form.upload-form action="/upload" method="post" enctype="multipart/form-data" {
            input type="file" name="photo" accept="image/jpeg,image/png,image/gif" required;
            input type="text" name="title" placeholder="Title";
            button type="submit" { "Upload" }
        }
    }
}

fn pagination_links(current_page: usize, total_pages: usize) -> Markup {
    html! {
        @if total_pages > 1 {
            nav.pagination {
                @for n in 1..=total_pages {
                    @if n == current_page {
                        span.current { (n) }
                    } @else {
                        a href={ "/?page=" (n) } { (n) }
                    }
                }
            }
        }
    }
}

/// Renders the gallery listing for one page of records.
pub fn render_gallery(page: &Page<ImageRecord>) -> Markup {
    let content = html! {
        h1 { "Gallery" }
        (upload_form())
        @if page.items.is_empty() {
            p.empty { "No images yet." }
        } @else {
            div.gallery-grid {
                @for image in &page.items {
                    figure.gallery-item {
                        img src=(image.url) alt=(image.title) loading="lazy";
                        @if !image.title.is_empty() {
                            figcaption { (image.title) }
                        }
                    }
                }
            }
        }
        (pagination_links(page.current_page, page.total_pages))
    };

    base_document("Gallery", content)
}
