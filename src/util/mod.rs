use crate::models::Page;

/// Title for a page created without an explicit name: "Untitled",
/// then "Untitled 2", "Untitled 3", ... skipping taken suffixes.
pub(crate) fn next_untitled_page_title(existing_pages: &[Page]) -> String {
    let base = "Untitled";

    let mut has_base = false;
    let mut max_suffix: u32 = 1;

    for p in existing_pages {
        let t = p.title.trim();
        if t == base {
            has_base = true;
            continue;
        }

        if let Some(rest) = t.strip_prefix(&format!("{} ", base)) {
            if let Ok(k) = rest.parse::<u32>() {
                if k >= max_suffix {
                    max_suffix = k;
                }
            }
        }
    }

    if !has_base {
        return base.to_string();
    }

    format!("{} {}", base, max_suffix.saturating_add(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn page(title: &str) -> Page {
        Page {
            id: format!("p-{title}"),
            workspace_id: "w-1".to_string(),
            title: title.to_string(),
            content: String::new(),
            icon_url: None,
            bookmarked: false,
            tags: vec![],
            deleted_at: None,
        }
    }

    #[test]
    fn untitled_when_none_exist() {
        assert_eq!(next_untitled_page_title(&[]), "Untitled");
        assert_eq!(next_untitled_page_title(&[page("Roadmap")]), "Untitled");
    }

    #[test]
    fn untitled_suffix_skips_taken() {
        let pages = vec![page("Untitled"), page("Untitled 2"), page("Untitled 4")];
        assert_eq!(next_untitled_page_title(&pages), "Untitled 5");
    }

    #[test]
    fn untitled_two_after_base() {
        assert_eq!(next_untitled_page_title(&[page("Untitled")]), "Untitled 2");
    }
}
