use chordsheet::test_support::{RecordingRenderer, RenderOp};
use chordsheet::{FontSlot, Overrides, Pagination, Problem, SheetError, Settings, Typesetter};
use pretty_assertions::assert_eq;

fn problems<R: chordsheet::Renderer>(ts: &Typesetter<R>) -> Vec<Problem> {
    ts.diagnostics().iter().map(|d| d.problem.clone()).collect()
}

fn text_sizes(out: &RecordingRenderer, wanted: &str) -> Vec<i32> {
    out.ops
        .iter()
        .filter_map(|op| match op {
            RenderOp::Text { text, font, .. } if text == wanted => Some(font.size),
            _ => None,
        })
        .collect()
}

#[test]
fn relative_size_needs_extensions() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_song("a.cho", "{textsize: +2}\n").unwrap();
    assert_eq!(problems(&ts), vec![Problem::RelativeSizeNotEnabled("textsize")]);
    assert_eq!(ts.state().styles.current(FontSlot::Text).size, 12);

    ts.process_song("b.cho", "{enable_extensions}\n{textsize: +2}\n")
        .unwrap();
    assert_eq!(ts.state().styles.current(FontSlot::Text).size, 14);
}

#[test]
fn zero_size_is_rejected() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_song("a.cho", "{chordsize: 0}\n").unwrap();
    assert!(matches!(
        problems(&ts).as_slice(),
        [Problem::InvalidValue { directive: "chordsize", .. }]
    ));
}

#[test]
fn three_columns_then_three_breaks() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_song(
        "cols.cho",
        "{columns: 3}\n{column_break}\n{column_break}\n{column_break}\n",
    )
    .unwrap();
    assert!(problems(&ts).is_empty());
    let cursor = &ts.state().cursor;
    assert_eq!(cursor.column_index, 0);
    assert_eq!(cursor.logical_page_count, 2);
}

#[test]
fn two_column_toggles_report_redundant_use() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_song("a.cho", "{tcoff}\n{tcon}\n{tcon}\n").unwrap();
    assert_eq!(
        problems(&ts),
        vec![Problem::NotMultiColumn, Problem::AlreadyMultiColumn]
    );
    assert_eq!(ts.state().cursor.max_columns, 2);
}

#[test]
fn transposes_root_and_bass() {
    let settings = Settings {
        transpose: 2,
        ..Settings::default()
    };
    let mut ts = Typesetter::new(settings, RecordingRenderer::new());
    ts.process_song("a.cho", "[C]la [Am/E]la [N.C.]\n").unwrap();
    let out = ts.finish().unwrap();
    let names: Vec<&str> = out.chord_lines()[0]
        .chords
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["D", "Bm/F#", "N.C."]);
}

#[test]
fn transposing_down_spells_flats() {
    let settings = Settings {
        transpose: -1,
        ..Settings::default()
    };
    let mut ts = Typesetter::new(settings, RecordingRenderer::new());
    ts.process_song("a.cho", "[D]la [Q]la\n").unwrap();
    assert_eq!(problems(&ts), vec![Problem::Transpose("Q".into())]);
    let out = ts.finish().unwrap();
    let names: Vec<&str> = out.chord_lines()[0]
        .chords
        .iter()
        .map(|c| c.name.as_str())
        .collect();
    assert_eq!(names, vec!["Db", "Q"]);
}

#[test]
fn config_sets_defaults_for_every_song() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_config(
        "chordrc",
        "{textsize: 14}\n{define: Amaj9 base-fret 4 frets x 0 3 1 4 x}\n",
    )
    .unwrap();
    ts.process_song("one.cho", "{textsize: 20}\nfirst\n").unwrap();
    ts.process_song("two.cho", "[Amaj9]second\n").unwrap();
    assert!(problems(&ts).is_empty(), "{:?}", ts.diagnostics());
    let out = ts.finish().unwrap();

    assert_eq!(text_sizes(&out, "first"), vec![20]);
    assert_eq!(text_sizes(&out, "second"), vec![14]);
    // configured chords carry no marker on their diagram
    assert!(out.ops.iter().any(|op| matches!(
        op,
        RenderOp::Grid { name, label: None, stub: false } if name == "Amaj9"
    )));
}

#[test]
fn song_definitions_are_marked() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_song("a.cho", "{define: Hx base-fret 1 frets 0 2 2 1 0 0}\n")
        .unwrap();
    ts.process_song("b.cho", "{chord: Amaj9 x 0 2 1 2 0}\n[Amaj9]x\n")
        .unwrap();
    let out = ts.finish().unwrap();
    assert!(out.ops.iter().any(|op| matches!(
        op,
        RenderOp::Grid { name, label: Some(l), .. } if name == "Amaj9" && l == "*"
    )));
}

#[test]
fn config_rejects_content_and_text() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_config("chordrc", "{title: nope}\nstray words\n{paper_type: a4}\n")
        .unwrap();
    assert_eq!(
        problems(&ts),
        vec![Problem::NotInStartup("title"), Problem::NotADirective]
    );
    assert_eq!(ts.state().geometry.name, "a4");
}

#[test]
fn geometry_is_startup_only() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_song("a.cho", "{paper_type: a4}\n").unwrap();
    assert_eq!(problems(&ts), vec![Problem::StartupOnly("paper_type")]);
    assert_eq!(ts.state().geometry.name, "letter");
}

#[test]
fn unknown_paper_override_is_fatal() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    let overrides = Overrides {
        paper: Some("legal".into()),
        ..Overrides::default()
    };
    assert!(matches!(
        ts.apply_overrides(&overrides),
        Err(SheetError::UnknownPaperType(name)) if name == "legal"
    ));
}

#[test]
fn overrides_win_over_config() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_config("chordrc", "{chordsize: 11}\n").unwrap();
    ts.apply_overrides(&Overrides {
        chord_size: Some(8),
        paper: Some("a4".into()),
        ..Overrides::default()
    })
    .unwrap();
    ts.begin().unwrap();
    assert_eq!(ts.state().styles.current(FontSlot::Chord).size, 8);
    assert_eq!(ts.state().geometry.width, 595.0);
}

#[test]
fn extension_directives_are_gated() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_song("a.cho", "{tab_size: 8}\n{conditional_break: 2}\n")
        .unwrap();
    assert_eq!(
        problems(&ts),
        vec![
            Problem::ExtensionsDisabled("tab_size"),
            Problem::ExtensionsDisabled("conditional_break"),
        ]
    );
}

#[test]
fn index_lists_titles_in_order() {
    let settings = Settings {
        table_of_contents: true,
        ..Settings::default()
    };
    let mut ts = Typesetter::new(settings, RecordingRenderer::new());
    ts.process_song("z.cho", "{title: Zebra}\n{subtitle: Stripes}\n")
        .unwrap();
    ts.process_song("a.cho", "{title: Apple}\n").unwrap();
    let out = ts.finish().unwrap();

    let texts = out.texts();
    let index = texts.iter().position(|t| *t == "Index").unwrap();
    assert_eq!(
        &texts[index + 1..index + 6],
        &["Apple", "2", "Zebra", "1", "Stripes"]
    );
    assert!(texts.contains(&"Page 3"));
}

#[test]
fn continuation_pages_repeat_the_title() {
    let mut ts = Typesetter::new(Settings::default(), RecordingRenderer::new());
    ts.process_song("long.cho", "{title: Long}\none\n{new_page}\ntwo\n")
        .unwrap();
    let out = ts.finish().unwrap();
    let texts = out.texts();
    assert_eq!(texts.iter().filter(|t| **t == "Long").count(), 2);
    assert!(texts.contains(&"Page 2"));
    assert!(!texts.contains(&"Page 1"));
}

#[test]
fn two_up_shares_a_sheet() {
    let settings = Settings {
        pagination: Pagination::Two,
        ..Settings::default()
    };
    let mut ts = Typesetter::new(settings, RecordingRenderer::new());
    ts.process_song("a.cho", "a\n").unwrap();
    ts.process_song("b.cho", "b\n").unwrap();
    let out = ts.finish().unwrap();
    assert_eq!(out.count(|op| matches!(op, RenderOp::BeginPhysicalPage(_))), 1);
    assert_eq!(out.ops.last(), Some(&RenderOp::EndDocument(1)));
}

#[test]
fn relative_size_cannot_reach_zero() {
    let settings = Settings {
        extensions: true,
        ..Settings::default()
    };
    let mut ts = Typesetter::new(settings, RecordingRenderer::new());
    ts.process_song("a.cho", "{textsize: -20}\nfirst\nsecond\n")
        .unwrap();
    assert_eq!(
        problems(&ts),
        vec![Problem::InvalidValue {
            directive: "textsize",
            value: "-20".into(),
        }]
    );
    assert_eq!(ts.state().styles.current(FontSlot::Text).size, 12);

    let out = ts.finish().unwrap();
    assert_eq!(text_sizes(&out, "first"), vec![12]);
    let rows: Vec<f64> = out
        .ops
        .windows(2)
        .filter_map(|pair| match pair {
            [RenderOp::MoveTo { v, .. }, RenderOp::Text { text, .. }]
                if text == "first" || text == "second" =>
            {
                Some(*v)
            }
            _ => None,
        })
        .collect();
    assert_eq!(rows.len(), 2);
    assert!(rows[1] < rows[0], "{rows:?}");
}
