//! DOM cleanup applied to rendered HTML before conversion
//!
//! All rewriting is streamed through `lol_html`. A rewriter failure leaves the input
//! unchanged rather than losing the page.

use lol_html::html_content::{ContentType, EndTag};
use scraper::{Html, Selector};
use std::cell::RefCell;
use std::rc::Rc;
use url::Url;

/// Elements removed from every page regardless of site config
pub const UNIVERSAL_REMOVALS: &[&str] = &[
    "script",
    "style",
    "noscript",
    "script[type=\"application/ld+json\"]",
];

/// Removes every element matching the given selectors plus [`UNIVERSAL_REMOVALS`]
///
/// Selectors the streaming rewriter cannot parse are skipped.
pub fn remove_elements(html: &str, selectors: &[String]) -> String {
    let valid: Vec<&str> = UNIVERSAL_REMOVALS
        .iter()
        .copied()
        .chain(selectors.iter().flat_map(|s| s.split(',')))
        .map(str::trim)
        .filter(|sel| !sel.is_empty())
        .filter(|sel| {
            let ok = sel.parse::<lol_html::Selector>().is_ok();
            if !ok {
                tracing::debug!("Skipping unsupported removal selector: {}", sel);
            }
            ok
        })
        .collect();

    let handlers = valid
        .iter()
        .map(|sel| {
            lol_html::element!(sel, |el| {
                el.remove();
                Ok(())
            })
        })
        .collect();

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: handlers,
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }
    if rewriter.end().is_err() {
        return html.to_string();
    }

    output
}

/// Extracts the language name from a wrapper's class list or `data-language`
fn language_hint(class: Option<&str>, data_language: Option<&str>) -> Option<String> {
    if let Some(lang) = data_language {
        let lang = lang.trim();
        if !lang.is_empty() {
            return Some(lang.to_string());
        }
    }

    class?.split_whitespace().find_map(|name| {
        name.strip_prefix("language-")
            .or_else(|| name.strip_prefix("highlight-"))
            .or_else(|| name.strip_prefix("lang-"))
            .filter(|lang| !lang.is_empty() && *lang != "none")
            .map(str::to_string)
    })
}

fn strike_through(el: &mut lol_html::html_content::Element<'_, '_>) {
    el.before("~~", ContentType::Html);
    el.after("~~", ContentType::Html);
    el.remove_and_keep_content();
}

/// Normalizes markup that the converter would otherwise lose
///
/// - a language hint on a wrapper (`language-*`, `highlight-*`, `data-language`) is
///   copied onto the inner `pre code` element as `language-*`
/// - `del`, `s` and `strike` become `~~` markers
/// - task-list checkboxes become `[x]` or `[ ]`
pub fn normalize_markup(html: &str) -> String {
    // Hints of the open wrapper elements, innermost last
    let hints: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let wrapper_hints = Rc::clone(&hints);
    let code_hints = Rc::clone(&hints);

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                lol_html::element!("*", move |el| {
                    if el.tag_name() == "code" {
                        return Ok(());
                    }
                    let class = el.get_attribute("class");
                    let data = el.get_attribute("data-language");
                    let Some(lang) = language_hint(class.as_deref(), data.as_deref()) else {
                        return Ok(());
                    };
                    let Some(end_handlers) = el.end_tag_handlers() else {
                        return Ok(());
                    };

                    wrapper_hints.borrow_mut().push(lang);
                    let closing = Rc::clone(&wrapper_hints);
                    let handler: lol_html::EndTagHandler<'static> =
                        Box::new(move |_end: &mut EndTag<'_>| {
                            closing.borrow_mut().pop();
                            Ok(())
                        });
                    end_handlers.push(handler);
                    Ok(())
                }),
                lol_html::element!("pre code", move |el| {
                    let own = language_hint(el.get_attribute("class").as_deref(), None);
                    let inherited = code_hints.borrow().last().cloned();
                    if own.is_none() {
                        if let Some(lang) = inherited {
                            let class = match el.get_attribute("class") {
                                Some(existing) => format!("{} language-{}", existing, lang),
                                None => format!("language-{}", lang),
                            };
                            el.set_attribute("class", &class).ok();
                        }
                    }
                    Ok(())
                }),
                lol_html::element!("del", |el| {
                    strike_through(el);
                    Ok(())
                }),
                lol_html::element!("s", |el| {
                    strike_through(el);
                    Ok(())
                }),
                lol_html::element!("strike", |el| {
                    strike_through(el);
                    Ok(())
                }),
                lol_html::element!("input[type=\"checkbox\"]", |el| {
                    let marker = if el.has_attribute("checked") {
                        "[x] "
                    } else {
                        "[ ] "
                    };
                    el.replace(marker, ContentType::Text);
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }
    if rewriter.end().is_err() {
        return html.to_string();
    }

    output
}

/// Returns the inner HTML of the first element matching `selector`
///
/// Falls back to the whole body when the selector is invalid or matches nothing.
pub fn select_content(html: &str, selector: &str) -> String {
    let document = Html::parse_document(html);

    if let Ok(sel) = Selector::parse(selector) {
        if let Some(element) = document.select(&sel).next() {
            return element.inner_html();
        }
    }

    tracing::debug!("Content selector '{}' matched nothing, using body", selector);
    Selector::parse("body")
        .ok()
        .and_then(|body| document.select(&body).next().map(|el| el.inner_html()))
        .unwrap_or_else(|| html.to_string())
}

/// Rewrites relative `href` and `src` attributes to absolute URLs
pub fn absolutize_urls(html: &str, base_url: &Url) -> String {
    fn resolve(value: &str, base_url: &Url) -> Option<String> {
        let value = value.trim();
        if value.is_empty() || value.starts_with('#') || value.starts_with("data:") {
            return None;
        }
        base_url.join(value).ok().map(|u| u.to_string())
    }

    let mut output = String::new();
    let mut rewriter = lol_html::HtmlRewriter::new(
        lol_html::Settings {
            element_content_handlers: vec![
                lol_html::element!("[href]", |el| {
                    if let Some(href) = el.get_attribute("href") {
                        if let Some(absolute) = resolve(&href, base_url) {
                            el.set_attribute("href", &absolute).ok();
                        }
                    }
                    Ok(())
                }),
                lol_html::element!("[src]", |el| {
                    if let Some(src) = el.get_attribute("src") {
                        if let Some(absolute) = resolve(&src, base_url) {
                            el.set_attribute("src", &absolute).ok();
                        }
                    }
                    Ok(())
                }),
            ],
            ..Default::default()
        },
        |c: &[u8]| {
            output.push_str(&String::from_utf8_lossy(c));
        },
    );

    if rewriter.write(html.as_bytes()).is_err() {
        return html.to_string();
    }
    if rewriter.end().is_err() {
        return html.to_string();
    }

    output
}
