/*!
 * Tests for page merging
 */

use pagetext::note::{merge_pages, ImageSlot, Page, PageBook, PageEntry, PageMerger};
use std::path::PathBuf;

fn ids(pages: &[Page]) -> Vec<&str> {
    pages.iter().map(|p| p.id.as_str()).collect()
}

#[test]
fn test_merge_pages_withOverlappingPage_shouldLetServerWin() {
    let local = vec![Page::new("a", 1, ""), Page::new("b", 2, "old")];
    let server = vec![Page::new("b", 2, "new"), Page::new("c", 3, "")];

    let merged = merge_pages(&local, &server);

    assert_eq!(ids(&merged), vec!["a", "b", "c"]);
    assert_eq!(merged[1].original_text, "new");
    assert_eq!(merged.iter().map(|p| p.page_number).collect::<Vec<_>>(), vec![1, 2, 3]);
}

#[test]
fn test_merge_pages_appliedTwice_shouldBeIdempotent() {
    let local = vec![Page::new("x", 5, "x"), Page::new("a", 1, "local a")];
    let server = vec![Page::new("a", 1, "server a"), Page::new("z", 0, "z"), Page::new("m", 5, "m")];

    let once = merge_pages(&local, &server);
    let twice = merge_pages(&once, &server);

    assert_eq!(once, twice);
}

#[test]
fn test_merge_pages_withShuffledInput_shouldSortByPageNumber() {
    let server = vec![
        Page::new("d", 4, ""),
        Page::new("b", 2, ""),
        Page::new("a", 1, ""),
        Page::new("c", 3, ""),
    ];
    let mut reversed = server.clone();
    reversed.reverse();

    assert_eq!(ids(&merge_pages(&[], &server)), vec!["a", "b", "c", "d"]);
    assert_eq!(merge_pages(&[], &server), merge_pages(&[], &reversed));
}

#[test]
fn test_merge_pages_withMalformedIds_shouldDropThem() {
    let local = vec![Page::new("  ", 1, "blank")];
    let server = vec![Page::new("", 2, "empty"), Page::new("ok", 3, "")];

    assert_eq!(ids(&merge_pages(&local, &server)), vec!["ok"]);
}

#[test]
fn test_merger_merge_withLoadedImage_shouldCarryOverSlot() {
    let previous = PageBook::from_entries(vec![
        PageEntry {
            page: Page::new("a", 1, "").with_image("a.png"),
            image: ImageSlot::Loaded(PathBuf::from("/cache/a.png")),
        },
        PageEntry {
            page: Page::new("b", 2, "").with_image("b.png"),
            image: ImageSlot::Failed,
        },
    ]);

    let server = vec![Page::new("a", 1, "text arrived").with_image("a.png"), Page::new("c", 3, "")];
    let merged = PageMerger::merge(&previous, &server);

    assert_eq!(merged.slot("a"), ImageSlot::Loaded(PathBuf::from("/cache/a.png")));
    assert_eq!(merged.slot("b"), ImageSlot::Failed);
    assert_eq!(merged.slot("c"), ImageSlot::NotLoaded);
    assert_eq!(merged.get("a").unwrap().page.original_text, "text arrived");
    assert_eq!(merged.ids(), vec!["a", "b", "c"]);
}

#[test]
fn test_merger_mergeInto_shouldReplaceSharedBook() {
    let shared = PageBook::from_pages(vec![Page::new("a", 2, "")]).into_shared();

    let count = PageMerger::merge_into(&shared, &[Page::new("b", 1, "")]);

    assert_eq!(count, 2);
    assert_eq!(shared.read().ids(), vec!["b", "a"]);
}
