//! End-to-end behavior of a session against an in-memory host.
//!
//! The document used throughout:
//!
//! ```text
//!  0  int x;
//!  1  #ifdef DEC
//!  2  x++;
//!  3  #ifdef FEAT
//!  4  y++;
//!  5  #endif
//!  6  #else
//!  7  x--;
//!  8  #endif
//!  9  z;
//! ```

use serde_json::{json, Value};
use varview::{
    generate_stylesheet, parse_tree, BranchCondition, CursorMoved, CursorResponse, FoldHost,
    FoldRange, Interval, MemoryHost, Palette, PredicateSuppressor, Region, Rgb, SessionError,
    StyleConfig, VariationalSession, Visibility,
};

const TEXT: &str =
    "int x;\n#ifdef DEC\nx++;\n#ifdef FEAT\ny++;\n#endif\n#else\nx--;\n#endif\nz;\n";

fn span(start: u32, end: u32) -> Value {
    json!({ "start": [start, 0], "end": [end, 0] })
}

fn region(segments: Vec<Value>, span: Option<Value>) -> Value {
    let mut region = json!({ "type": "region", "segments": segments });
    if let Some(span) = span {
        region["span"] = span;
    }
    region
}

fn text(content: &str) -> Value {
    json!({ "type": "text", "content": content })
}

/// A choice whose then branch runs from `then.0` to `then.1` and whose else
/// branch, if any, runs on to `end`.
fn choice(name: &str, then: (u32, u32), nested: Vec<Value>, else_end: Option<u32>) -> Value {
    let mut then_segments = vec![text("line\n")];
    then_segments.extend(nested);
    let (elsebranch, end) = match else_end {
        Some(end) => (region(vec![text("else\n")], Some(span(then.1, end))), end),
        None => (region(Vec::new(), None), then.1),
    };
    json!({
        "type": "choice",
        "name": name,
        "kind": "positive",
        "thenbranch": region(then_segments, Some(span(then.0, then.1))),
        "elsebranch": elsebranch,
        "span": { "start": [then.0, 0], "end": [end, 6] },
    })
}

fn parse(document: Value) -> Region {
    parse_tree(&document.to_string()).unwrap()
}

fn full_document() -> Region {
    let feat = choice("FEAT", (3, 5), Vec::new(), None);
    parse(region(
        vec![text("int x;\n"), choice("DEC", (1, 6), vec![feat], Some(8))],
        None,
    ))
}

fn setup() -> (MemoryHost, VariationalSession<MemoryHost>) {
    varview_log::test();
    let mut host = MemoryHost::with_text(TEXT);
    let session = VariationalSession::new(&mut host, StyleConfig::default(), Palette::default());
    (host, session)
}

fn iv(start: u32, end: u32) -> Interval {
    Interval::new(start, end).unwrap()
}

#[test]
fn resync_decorates_styles_and_hides_directives() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();

    assert_eq!(
        session.forest().outline(),
        "[2, 6) DEC defbranch dimension-marker-DEC-defbranch\n  \
         [4, 5) FEAT defbranch dimension-marker-DEC-defbranch-FEAT-defbranch\n\
         [7, 8) DEC ndefbranch dimension-marker-DEC-ndefbranch\n"
    );
    assert_eq!(session.predicates().tracked_rows(), vec![1, 3, 5, 6, 8]);
    assert!(session
        .predicates()
        .tracked_rows()
        .into_iter()
        .all(|row| session.predicates().is_hidden(row)));

    let stylesheet = session.stylesheet().unwrap();
    assert_eq!(stylesheet.lines().count(), 9);
    assert_eq!(host.stylesheets().len(), 2);
    assert!(host.stylesheets().contains(&stylesheet.to_string()));
    assert_eq!(
        session.palette().dimensions().collect::<Vec<_>>(),
        vec![("DEC", Rgb::new(127, 71, 62)), ("FEAT", Rgb::new(127, 71, 62))]
    );
}

#[test]
fn top_level_branch_seeds_gradient_with_shaded_color() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();

    // The root's plain shade is the first stop of its children's gradients.
    let stylesheet = session.stylesheet().unwrap();
    assert!(stylesheet.contains(
        "div.dimension-marker-DEC-defbranch-FEAT-defbranch.line { background: \
         linear-gradient(90deg, rgba(139, 78, 68, 0.3) 0%, rgba(139, 78, 68, 0.3) 1%) }"
    ));
}

#[test]
fn resync_with_unchanged_tree_keeps_annotations() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();
    let outline = session.forest().outline();
    let created = host.decorations_created();
    let folds = host.folds();

    session.resync(&mut host, &full_document()).unwrap();

    assert_eq!(session.forest().outline(), outline);
    assert_eq!(host.decorations_created(), created);
    assert_eq!(host.folds(), folds);
    assert_eq!(host.stylesheets().len(), 2);
}

#[test]
fn removed_choice_is_swept() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();

    let without_feat = parse(region(
        vec![choice("DEC", (1, 6), Vec::new(), Some(8))],
        None,
    ));
    session.resync(&mut host, &without_feat).unwrap();

    assert_eq!(session.forest().len(), 2);
    assert!(session.forest().filter_dimension("FEAT").is_empty());
    assert!(!session.palette().contains("FEAT"));
    assert!(!session.stylesheet().unwrap().contains("FEAT"));
    assert_eq!(host.decorations().len(), 2);
}

#[test]
fn removed_choice_directives_stay_folded_until_destroy() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();

    let without_feat = parse(region(
        vec![choice("DEC", (1, 6), Vec::new(), Some(8))],
        None,
    ));
    session.resync(&mut host, &without_feat).unwrap();
    assert_eq!(session.predicates().tracked_rows(), vec![1, 3, 5, 6, 8]);
    assert!(session.predicates().is_hidden(3));

    session.destroy(&mut host);
    assert!(session.predicates().tracked_rows().is_empty());
    assert!(host.folds().is_empty());
}

#[test]
fn removed_parent_promotes_and_relabels_child() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();
    let created = host.decorations_created();

    let only_feat = parse(region(vec![choice("FEAT", (3, 5), Vec::new(), None)], None));
    session.resync(&mut host, &only_feat).unwrap();

    assert_eq!(
        session.forest().outline(),
        "[4, 5) FEAT defbranch dimension-marker-FEAT-defbranch\n"
    );
    assert_eq!(host.decorations_created(), created);
    assert_eq!(
        host.decorations(),
        vec![(iv(4, 5), "dimension-marker-FEAT-defbranch".to_string())]
    );
    assert!(session
        .stylesheet()
        .unwrap()
        .contains("div.dimension-marker-FEAT-defbranch.line { background-color:"));
}

#[test]
fn malformed_tree_fails_resync() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();
    let outline = session.forest().outline();
    let stylesheet = session.stylesheet().map(str::to_string);

    // FEAT's branch straddles the end of DEC's then branch.
    let overlapping = parse(region(
        vec![
            choice("DEC", (1, 6), Vec::new(), Some(8)),
            choice("FEAT", (4, 7), Vec::new(), None),
        ],
        None,
    ));
    let err = session.resync(&mut host, &overlapping).unwrap_err();

    assert!(matches!(err, SessionError::Forest { ref dimension, .. } if dimension == "FEAT"));
    assert_eq!(session.forest().outline(), outline);
    assert_eq!(session.stylesheet().map(str::to_string), stylesheet);
}

#[test]
fn color_change_restyles() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();
    session
        .set_dimension_color(&mut host, "FEAT", Rgb::new(0, 100, 200))
        .unwrap();

    assert!(session
        .stylesheet()
        .unwrap()
        .contains("rgba(0, 110, 220, 0.3) 1%"));
    assert_eq!(host.stylesheets().len(), 2);
}

#[test]
fn show_dimension_choice_folds_the_other_branch() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();
    let predicate_folds = host.folds().len();

    assert_eq!(
        session.show_dimension_choice(&mut host, "DEC", Some(BranchCondition::Defbranch)),
        1
    );
    assert_eq!(session.folded_choice("DEC"), Some(BranchCondition::Ndefbranch));
    assert!(host.folds().contains(&FoldRange::rows(7, 7)));

    assert_eq!(
        session.show_dimension_choice(&mut host, "DEC", Some(BranchCondition::Ndefbranch)),
        1
    );
    assert!(!host.folds().contains(&FoldRange::rows(7, 7)));
    assert!(host.folds().contains(&FoldRange::rows(2, 5)));
    assert_eq!(host.folds().len(), predicate_folds + 1);

    assert_eq!(session.show_dimension_choice(&mut host, "DEC", None), 0);
    assert_eq!(session.folded_choice("DEC"), None);
    assert_eq!(host.folds().len(), predicate_folds);

    assert_eq!(
        session.show_dimension_choice(&mut host, "MISSING", Some(BranchCondition::Defbranch)),
        0
    );
}

#[test]
fn cursor_reveals_directive_and_consumes_echo() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();

    host.move_cursor(varview::Position::new(7, 2));
    // Row 6 is folded, so moving up from row 7 lands on row 5.
    let event = host.move_cursor(varview::Position::new(5, 2));
    let response = session.handle_cursor_moved(&mut host, event);

    assert_eq!(response, CursorResponse::Revealed(varview::Position::new(6, 2)));
    assert_eq!(session.predicates().visibility(6), Some(Visibility::Shown));
    assert_eq!(host.cursor(), varview::Position::new(6, 2));

    let echoes = host.take_cursor_events();
    assert_eq!(echoes.len(), 1);
    assert_eq!(
        session.handle_cursor_moved(&mut host, echoes[0]),
        CursorResponse::Consumed
    );
    assert_eq!(session.predicates().shown_rows(), vec![6]);
}

#[test]
fn destroy_releases_everything() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();
    session.show_dimension_choice(&mut host, "DEC", Some(BranchCondition::Defbranch));

    session.destroy(&mut host);

    assert!(host.decorations().is_empty());
    assert!(host.folds().is_empty());
    assert!(host.stylesheets().is_empty());
    assert_eq!(host.marker_count(), 0);
    assert!(session.forest().is_empty());
    assert_eq!(session.stylesheet(), None);
}

#[test]
fn palette_colors_apply_to_generated_rules() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();

    let css = generate_stylesheet(
        session.forest().decorations(),
        session.palette(),
        &StyleConfig::default(),
    )
    .unwrap();
    assert_eq!(Some(css.as_str()), session.stylesheet());
}

fn directive_host() -> (MemoryHost, PredicateSuppressor<varview::MemoryMarker>) {
    varview_log::test();
    let mut host = MemoryHost::with_text("a\nb\nc\nd\ne\nf\n#if\ng\n");
    let mut predicates = PredicateSuppressor::new(&mut host);
    predicates.add(&mut host, [6]);
    assert!(predicates.is_hidden(6));
    (host, predicates)
}

/// Cursor moves from row 5 to row 6, where a hidden directive of length 3 sits.
#[test]
fn directive_reveal_clamps_column_to_line_length() {
    let (mut host, mut predicates) = directive_host();

    let old = varview::Position::new(5, 10);
    let new = varview::Position::new(6, 10);
    let response = predicates.handle_cursor_moved(&mut host, CursorMoved::new(old, new));

    assert_eq!(response, CursorResponse::Revealed(varview::Position::new(6, 3)));
    assert!(!predicates.is_hidden(6));
    assert_eq!(host.line_length(6), 3);
    assert_eq!(host.cursor(), varview::Position::new(6, 3));

    let echo = CursorMoved::new(new, varview::Position::new(6, 3));
    assert_eq!(
        predicates.handle_cursor_moved(&mut host, echo),
        CursorResponse::Consumed
    );
    assert_eq!(predicates.expected_position(), None);
}

/// The fold on row 6 makes the host step straight from row 5 to row 7.
#[test]
fn directive_reveal_catches_cursor_skipping_the_fold() {
    let (mut host, mut predicates) = directive_host();

    let old = varview::Position::new(5, 10);
    let new = varview::Position::new(7, 10);
    let response = predicates.handle_cursor_moved(&mut host, CursorMoved::new(old, new));

    assert_eq!(response, CursorResponse::Revealed(varview::Position::new(6, 3)));
    assert!(!predicates.is_hidden(6));
}

#[test]
fn moved_choice_overlapping_its_old_range_resyncs() {
    varview_log::test();
    let mut host = MemoryHost::with_text(&"line\n".repeat(14));
    let mut session =
        VariationalSession::new(&mut host, StyleConfig::default(), Palette::default());
    let document = |then| parse(region(vec![choice("A", then, Vec::new(), None)], None));

    session.resync(&mut host, &document((1, 10))).unwrap();
    session.resync(&mut host, &document((4, 12))).unwrap();
    assert_eq!(
        session.forest().outline(),
        "[5, 12) A defbranch dimension-marker-A-defbranch\n"
    );
    assert_eq!(
        host.decorations(),
        vec![(iv(5, 12), "dimension-marker-A-defbranch".to_string())]
    );

    // Nothing stale is left to trip over.
    session.resync(&mut host, &document((4, 12))).unwrap();
    assert_eq!(session.forest().len(), 1);
    assert_eq!(host.decorations().len(), 1);
}

#[test]
fn at_most_one_directive_is_shown_while_walking() {
    let (mut host, mut session) = setup();
    session.resync(&mut host, &full_document()).unwrap();

    let walk = [0, 2, 4, 7, 9, 7, 4, 2, 0];
    for row in walk {
        let event = host.move_cursor(varview::Position::new(row, 0));
        session.handle_cursor_moved(&mut host, event);
        for echo in host.take_cursor_events() {
            session.handle_cursor_moved(&mut host, echo);
        }
        assert!(
            session.predicates().shown_rows().len() <= 1,
            "shown {:?} after moving to row {row}",
            session.predicates().shown_rows()
        );
    }
}
