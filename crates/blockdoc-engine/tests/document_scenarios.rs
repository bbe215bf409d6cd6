use blockdoc_engine::coding::clipboard::ClipboardContent;
use blockdoc_engine::{
    Attachment, BlockDocument, BlockKind, BlockVariant, Cmd, InlineStyle, Selection,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn type_keys(doc: &mut BlockDocument, keys: &str) {
    for ch in keys.chars() {
        let caret = doc.selection().caret_offset().unwrap_or(doc.len());
        if ch == '\u{8}' {
            if caret > 0 {
                doc.request_edit(caret - 1..caret, "");
            }
        } else {
            doc.request_edit(caret..caret, &ch.to_string());
        }
    }
}

fn assert_block_invariants(doc: &BlockDocument) {
    doc.check_invariants();
    let blocks = doc.blocks();
    assert!(!blocks.is_empty());
    let total: usize = blocks.iter().map(|b| b.length).sum();
    assert_eq!(total, doc.len());
    assert_eq!(doc.text().encode_utf16().count(), doc.len());
    for (i, block) in blocks.iter().enumerate() {
        assert_eq!(block.index, i);
        if i > 0 {
            assert_eq!(block.offset, blocks[i - 1].end());
        }
    }
}

/// A document touching every text-bearing kind.
fn mixed_document() -> BlockDocument {
    let mut doc = BlockDocument::new();
    type_keys(&mut doc, "# Plan\nintro text\n- one\n\ttwo\n\u{8}\u{8}1. first\nsecond\n");
    doc
}

#[test]
fn test_mixed_document_shape() {
    let doc = mixed_document();
    insta::assert_snapshot!(doc.outline(), @r#"
    0: header1 "Plan"
    1: text "intro text"
    2: list level=0 "one"
    3: list level=1 "two"
    4: orderedList level=0 position=0 "first"
    5: orderedList level=0 position=1 "second"
    6: orderedList level=0 position=2 ""
    "#);
}

#[test]
fn test_end_to_end_header_then_list() {
    let mut doc = BlockDocument::new();
    assert_eq!(doc.text(), "");

    type_keys(&mut doc, "# Title\n");
    insta::assert_snapshot!(doc.outline(), @r#"
    0: header1 "Title"
    1: text ""
    "#);

    type_keys(&mut doc, "* item");
    insta::assert_snapshot!(doc.outline(), @r#"
    0: header1 "Title"
    1: list level=0 "item"
    "#);
    assert_eq!(doc.text(), "Title\n•\titem");
    assert_eq!(doc.blocks()[1].marker_length(), 2);
}

#[rstest]
#[case("# ", BlockKind::Header1)]
#[case("## ", BlockKind::Header2)]
#[case("- ", BlockKind::List)]
#[case("* ", BlockKind::List)]
#[case("1. ", BlockKind::OrderedList)]
fn test_promotion_consumes_the_trigger(#[case] trigger: &str, #[case] kind: BlockKind) {
    let mut doc = BlockDocument::new();
    type_keys(&mut doc, trigger);

    assert_eq!(doc.block_count(), 1);
    let block = &doc.blocks()[0];
    assert_eq!(block.kind(), kind);
    assert_eq!(doc.content(0), "");
    assert_eq!(block.indentation_level().unwrap_or(0), 0);
    if let BlockVariant::OrderedList(item) = &block.variant {
        assert_eq!(item.position, 0);
        assert_eq!(doc.text(), "1.\t");
    }
}

#[test]
fn test_merge_decreases_block_count_by_one() {
    let mut doc = BlockDocument::from_text("AB\nCD");
    let start = doc.content_range(1).start;
    doc.set_selection(Selection::caret(1, start));

    type_keys(&mut doc, "\u{8}");

    assert_eq!(doc.block_count(), 1);
    assert_eq!(doc.content(0), "ABCD");
    assert_block_invariants(&doc);
}

#[rstest]
#[case("one\ntwo\nthree", 3)]
#[case("a\nb", 2)]
#[case("x\n\n\ny", 4)]
fn test_paste_lines_into_empty_block(#[case] text: &str, #[case] lines: usize) {
    let mut doc = BlockDocument::from_text("top\n\nbottom");
    let before = doc.len();
    let at = doc.content_range(1).start;

    assert!(doc.paste(at..at, &ClipboardContent::plain(text)).unwrap());

    assert_eq!(doc.block_count(), 2 + lines);
    assert_eq!(doc.len(), before + text.len());
    let pasted: Vec<String> = (1..1 + lines).map(|i| doc.content(i)).collect();
    assert_eq!(pasted.join("\n"), text);
    assert_eq!(doc.content(1 + lines), "bottom");
    assert_block_invariants(&doc);
}

#[test]
fn test_ordered_list_renumbers_after_delete() {
    let mut doc = BlockDocument::new();
    type_keys(&mut doc, "1. a\nb\nc");
    insta::assert_snapshot!(doc.outline(), @r#"
    0: orderedList level=0 position=0 "a"
    1: orderedList level=0 position=1 "b"
    2: orderedList level=0 position=2 "c"
    "#);

    assert!(doc.delete_blocks(0..1));
    insta::assert_snapshot!(doc.outline(), @r#"
    0: orderedList level=0 position=0 "b"
    1: orderedList level=0 position=1 "c"
    "#);
    assert_eq!(doc.text(), "1.\tb\n2.\tc");
}

#[test]
fn test_apply_styles_is_idempotent() {
    let mut doc = mixed_document();
    for index in 0..doc.block_count() {
        doc.apply_styles(index, false);
        let len = doc.len();
        let runs: Vec<_> = doc
            .buffer()
            .runs(0..len)
            .into_iter()
            .map(|(range, attributes)| (range, attributes.clone()))
            .collect();

        assert!(!doc.apply_styles(index, false));

        let again: Vec<_> = doc
            .buffer()
            .runs(0..len)
            .into_iter()
            .map(|(range, attributes)| (range, attributes.clone()))
            .collect();
        assert_eq!(runs, again);
    }
}

#[rstest]
#[case(InlineStyle::Bold, 0..4)]
#[case(InlineStyle::Italic, 5..9)]
#[case(InlineStyle::Code, 2..7)]
#[case(InlineStyle::Strikethrough, 0..14)]
#[case(InlineStyle::Underline, 10..14)]
fn test_toggle_twice_restores_uniform_ranges(
    #[case] style: InlineStyle,
    #[case] range: std::ops::Range<usize>,
) {
    let mut doc = BlockDocument::from_text("plain text\nmore");
    let before = doc.serialize();

    assert!(doc.toggle_inline_style(style, range.clone()));
    assert_ne!(doc.serialize(), before);
    assert!(doc.toggle_inline_style(style, range));

    assert_eq!(doc.serialize(), before);
}

#[test]
fn test_toggle_on_partly_styled_range_clears() {
    let mut doc = BlockDocument::from_text("abcdef");
    doc.toggle_inline_style(InlineStyle::Bold, 0..2);

    doc.toggle_inline_style(InlineStyle::Bold, 0..6);
    assert!((0..6).all(|i| !doc.buffer().attributes_at(i).inline.contains(InlineStyle::Bold)));

    doc.toggle_inline_style(InlineStyle::Bold, 0..6);
    assert!((0..6).all(|i| doc.buffer().attributes_at(i).inline.contains(InlineStyle::Bold)));
}

#[test]
fn test_serialize_load_round_trip() {
    let mut doc = mixed_document();
    doc.toggle_inline_style(InlineStyle::Bold, 8..12);
    doc.toggle_inline_style(InlineStyle::Italic, 10..15);
    let last = doc.block_count();
    doc.insert_image(last, Attachment::new(120.0, 80.0), Some("diagram".to_string()));
    let coded = doc.serialize();

    let mut loaded = BlockDocument::new();
    let report = loaded.load(&coded).unwrap();

    assert!(report.warnings.is_empty());
    assert_eq!(loaded.text(), doc.text());
    assert_eq!(loaded.outline(), doc.outline());
    assert_eq!(loaded.serialize(), coded);
    assert_block_invariants(&loaded);
    assert!(!loaded.can_undo());
}

#[test]
fn test_image_block_never_last() {
    let mut doc = BlockDocument::from_text("caption");
    let index = doc.insert_image(1, Attachment::new(10.0, 10.0), None);

    assert_eq!(doc.blocks()[index].kind(), BlockKind::Image);
    assert_eq!(doc.blocks().last().map(|b| b.kind()), Some(BlockKind::Text));

    // deleting the trailing block brings a fresh one back
    let last = doc.block_count() - 1;
    doc.delete_blocks(last..last + 1);
    assert_eq!(doc.blocks().last().map(|b| b.kind()), Some(BlockKind::Text));
    assert_block_invariants(&doc);
}

#[test]
fn test_typing_undoes_as_one_step() {
    let mut doc = BlockDocument::from_text("x");
    doc.set_selection(Selection::caret(0, 1));
    type_keys(&mut doc, "yz");

    assert_eq!(doc.text(), "xyz");
    let patch = doc.apply(Cmd::Undo);
    assert!(patch.accepted);
    assert_eq!(doc.text(), "x");
    assert!(doc.apply(Cmd::Redo).accepted);
    assert_eq!(doc.text(), "xyz");
}

#[test]
fn test_promotion_is_its_own_undo_step() {
    let mut doc = BlockDocument::new();
    type_keys(&mut doc, "# T");

    assert!(doc.undo());
    insta::assert_snapshot!(doc.outline(), @r#"0: header1 """#);
    assert!(doc.undo());
    assert_eq!(doc.blocks()[0].kind(), BlockKind::Text);
}

/// Every edit range of a plain three-line document, including ranges that
/// start in the middle of one block and end inside a later one.
#[test]
fn test_every_range_keeps_invariants_and_splices_text() {
    let original = "ab\ncd\nef";
    let len = original.len();
    for start in 0..=len {
        for end in start..=len {
            for text in ["", "X", "Y\nZ"] {
                let mut doc = BlockDocument::from_text(original);
                let accepted = doc.request_edit(start..end, text);

                let expected = format!("{}{text}{}", &original[..start], &original[end..]);
                assert_eq!(
                    accepted,
                    expected != original,
                    "edit {start}..{end} {text:?}"
                );
                assert_eq!(doc.text(), expected, "edit {start}..{end} {text:?}");
                assert_eq!(doc.block_count(), expected.split('\n').count());
                assert_block_invariants(&doc);
            }
        }
    }
}

/// A header, a bullet, an ordered item and an image, with characters
/// outside the basic plane in every text block.
fn astral_document() -> BlockDocument {
    let mut doc = BlockDocument::from_text("🦀 ok\nab😀\nx🎉\nend");
    doc.set_block_kind(BlockKind::Header1, 0..1);
    doc.set_block_kind(BlockKind::List, 1..2);
    doc.set_block_kind(BlockKind::OrderedList, 2..3);
    doc.insert_image(3, Attachment::new(4.0, 4.0), None);
    doc
}

#[test]
fn test_astral_document_shape() {
    let doc = astral_document();
    let kinds: Vec<BlockKind> = doc.blocks().iter().map(|b| b.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            BlockKind::Header1,
            BlockKind::List,
            BlockKind::OrderedList,
            BlockKind::Image,
            BlockKind::Text,
        ]
    );
    assert_eq!(doc.text(), "🦀 ok\n•\tab😀\n1.\tx🎉\n\u{FFFC}\nend");
}

/// Every range, including ends inside surrogate pairs, list markers and the
/// image placeholder.
#[test]
fn test_every_range_of_mixed_astral_document_keeps_invariants() {
    let len = astral_document().len();
    for start in 0..=len {
        for end in start..=len {
            for text in ["", "X", "🦀\nZ"] {
                let mut doc = astral_document();
                doc.request_edit(start..end, text);
                assert_block_invariants(&doc);
                assert!(
                    doc.text().chars().all(|c| c != char::REPLACEMENT_CHARACTER),
                    "edit {start}..{end} {text:?} split a character"
                );
            }
        }
    }
}

/// Deletions starting inside list and header content and reaching into
/// later blocks.
#[test]
fn test_mid_block_deletions_across_kinds() {
    let reference = mixed_document();
    let starts: Vec<usize> = (0..reference.block_count())
        .filter_map(|i| {
            let content = reference.content_range(i);
            (content.len() > 1).then_some(content.start + 1)
        })
        .collect();
    let len = reference.len();

    for &start in &starts {
        for end in start + 1..=len {
            let mut doc = mixed_document();
            doc.request_edit(start..end, "");
            assert_block_invariants(&doc);
            assert!(doc.len() <= len);
        }
    }
}
