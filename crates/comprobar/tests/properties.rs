//! Property tests over the Todo page object: entry trimming and toggle
//! round-trips hold for arbitrary titles, not just the fixtures.

mod common;

use common::{todo_session, STORAGE_KEY, TODO_URL};
use comprobar::prelude::*;
use proptest::prelude::*;

fn page() -> TodoPage {
    TodoPage::new(TODO_URL, STORAGE_KEY)
}

/// A title that survives trimming, with arbitrary surrounding whitespace
fn padded_title() -> impl Strategy<Value = (String, String)> {
    ("[a-z]{1,12}", 0usize..3, 0usize..3).prop_map(|(core, left, right)| {
        let padded = format!("{}{}{}", " ".repeat(left), core, " ".repeat(right));
        (core, padded)
    })
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 16, ..ProptestConfig::default() })]

    #[test]
    fn entered_titles_are_stored_trimmed(titles in prop::collection::vec(padded_title(), 1..4)) {
        let session = todo_session();
        let page = page();
        page.open(&session).unwrap();

        for (_, padded) in &titles {
            page.add(&session, padded).unwrap();
        }

        let expected: Vec<&str> = titles.iter().map(|(core, _)| core.as_str()).collect();
        page.assert_titles(&session, &expected).unwrap();
        page.assert_stored_count(&session, titles.len()).unwrap();
        for (index, (core, _)) in titles.iter().enumerate() {
            page.assert_stored_title(&session, index, core).unwrap();
        }

        // Persistence: a reload rebuilds the same list from storage.
        session.reload().unwrap();
        page.assert_loaded(&session).unwrap();
        page.assert_count(&session, titles.len()).unwrap();
        page.assert_titles(&session, &expected).unwrap();
    }

    #[test]
    fn double_toggle_is_identity(core in "[a-z]{1,12}", start_completed in any::<bool>()) {
        let session = todo_session();
        let page = page();
        page.open(&session).unwrap();
        page.add(&session, &core).unwrap();
        page.set_completed(&session, 0, start_completed).unwrap();

        page.toggle(&session, 0).unwrap();
        page.toggle(&session, 0).unwrap();

        page.assert_completed(&session, 0, start_completed).unwrap();
        page.assert_stored_completed(&session, 0, start_completed).unwrap();
    }

    #[test]
    fn editing_with_padding_equals_editing_trimmed(
        original in "[a-z]{1,12}",
        (replacement, padded) in padded_title(),
    ) {
        let session = todo_session();
        let page = page();
        page.open(&session).unwrap();
        page.add(&session, &original).unwrap();

        page.edit(&session, 0, &padded).unwrap();

        page.assert_titles(&session, &[replacement.as_str()]).unwrap();
        page.assert_stored_title(&session, 0, &replacement).unwrap();
    }
}
