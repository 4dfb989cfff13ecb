use doctree::{
    Direction, Document, EditError, FileHeader, Location, Node, delete_at, from_ordered_dict,
    insert_at, move_down, move_in_direction, move_up, page_from_value, page_to_value, resolve,
    section_from_value, section_to_value, to_ordered_dict,
};
use tree_test_support::{assert_same_tree, child_briefs, sample_page, sample_section, text_div};

fn at<D: Document>(doc: &D, text: &str) -> Location {
    doc.parse_location(text).unwrap()
}

#[test]
fn location_string_round_trip() {
    let loc: Location = "body-3-0-2".parse().unwrap();
    assert_eq!(loc, Location::in_tree("body", vec![3, 0, 2]));
    assert_eq!(loc.to_string(), "body-3-0-2");

    let section = sample_section();
    let loc = at(&section, "footer-1");
    assert_eq!(loc.container, None);
    assert_eq!(loc.path, vec![1]);
    let loc = at(&section, "footlink-0-1");
    assert_eq!(loc.container, Some(0));
    assert_eq!(loc.path, vec![1]);
}

#[test]
fn text_inserted_at_a_part_becomes_its_first_child() {
    let mut page = sample_page();
    let target = at(&page, "body-0");
    let landed = insert_at(&mut page, &target, Node::text("new")).unwrap();
    assert_eq!(landed.to_string(), "body-0-0");
    assert_eq!(child_briefs(&page, "body-0"), ["new", "a", "b", "c"]);
}

#[test]
fn move_down_swaps_with_next_sibling() {
    let mut page = sample_page();
    let target = at(&page, "body-0-0");
    let landed = move_down(&mut page, &target).unwrap();
    assert_eq!(landed.to_string(), "body-0-1");
    assert_eq!(child_briefs(&page, "body-0"), ["b", "a", "c"]);
}

#[test]
fn widget_indexes_follow_moves() {
    let mut page = sample_page();
    let target = at(&page, "body-1");
    move_up(&mut page, &target).unwrap();
    assert_eq!(page.widgets()["tabs"].to_string(), "body-0");
    // Content of the widget's containers is still addressed through its name.
    assert_eq!(child_briefs(&page, "tabs-0"), ["tab one"]);
    let target = at(&page, "body-1");
    move_in_direction(&mut page, &target, Direction::DownRight).unwrap_err();
}

#[test]
fn widget_moves_into_a_part_and_back() {
    let original = sample_page();
    let mut page = original.clone();
    let target = at(&page, "body-1");
    let inside = move_in_direction(&mut page, &target, Direction::UpRight).unwrap();
    assert_eq!(inside.to_string(), "body-0-3");
    assert_eq!(page.widgets()["tabs"], inside);
    let back = move_in_direction(&mut page, &inside, Direction::Down).unwrap();
    assert_eq!(back.to_string(), "body-1");
    assert_eq!(page, original);
}

#[test]
fn boundaries_reject_without_changing_the_tree() {
    let original = sample_page();
    for (loc, direction) in [
        ("body-0", Direction::Up),
        ("body-4", Direction::Down),
        ("body-0-0", Direction::UpRight),
        ("body-4", Direction::DownRight),
        ("tabs-0-0", Direction::Down),
    ] {
        let mut page = original.clone();
        let target = at(&page, loc);
        let err = move_in_direction(&mut page, &target, direction).unwrap_err();
        assert!(matches!(err, EditError::CannotMove(_)), "{loc} {direction:?}: {err}");
        assert_same_tree(
            original.tree("body").unwrap(),
            page.tree("body").unwrap(),
        );
    }
}

#[test]
fn insert_into_empty_container_then_delete() {
    let original = sample_page();
    let mut page = original.clone();
    let target = at(&page, "tabs-1-0");
    let landed = insert_at(&mut page, &target, text_div(&["x"])).unwrap();
    assert_eq!(landed.to_string(), "tabs-1-0");
    assert_eq!(resolve(&page, &landed).unwrap(), &text_div(&["x"]));
    delete_at(&mut page, &landed).unwrap();
    assert_eq!(page, original);
}

#[test]
fn every_node_of_the_sample_round_trips() {
    let page = sample_page();
    for top in page.top_keys() {
        for child in page.tree(top).unwrap().children().unwrap() {
            assert_eq!(&from_ordered_dict(&to_ordered_dict(child)).unwrap(), child);
        }
    }
}

#[test]
fn documents_round_trip_through_files() {
    let header = FileHeader::new("5.0.0", "0.0.1");
    let page = sample_page();
    let text = serde_json::to_string_pretty(&page_to_value(&page, &header)).unwrap();
    let (read_header, back) =
        page_from_value(&serde_json::from_str(&text).unwrap(), "demo").unwrap();
    assert_eq!(read_header, header);
    assert_eq!(back.kind, page.kind);
    assert_eq!(back.widgets(), page.widgets());
    assert_eq!(back.placeholders(), page.placeholders());

    let section = sample_section();
    let (_, back) = section_from_value(&section_to_value(&section, &header), None).unwrap();
    assert_eq!(back.tree, section.tree);
    assert_eq!(back.widgets(), section.widgets());
}
