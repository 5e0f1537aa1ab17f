//! Integration tests for the command engine
//!
//! Full keystroke scripts against real grammars and an in-memory host.

use std::time::Duration;
use syntax_cursor::commands::ESCAPE;
use syntax_cursor::{
    Buffer, ByteSpan, Config, Engine, ExitMode, InputEvent, ModeExit, RecordingHost, Replacement,
    SupportLang,
};
use tokio::sync::mpsc::unbounded_channel;
use tokio_util::sync::CancellationToken;

const STATEMENTS: &str = "const a = 1;\nconst b = 2;\n";
const COMMENT: &str = "// comment\n";

fn engine_with(host: RecordingHost, source: &str) -> Engine<RecordingHost> {
    let buffer = Buffer::new(SupportLang::JavaScript, source).unwrap();
    Engine::new(buffer, host, Config::default()).unwrap()
}

fn engine(source: &str) -> Engine<RecordingHost> {
    engine_with(RecordingHost::new(source), source)
}

/// Engine focused on the outermost node starting at `needle`.
fn focused(source: &str, needle: &str) -> Engine<RecordingHost> {
    let mut engine = engine(source);
    assert!(engine.focus_at(source.find(needle).unwrap()));
    engine
}

fn current_text(engine: &mut Engine<RecordingHost>) -> String {
    let span = engine.current_span().unwrap();
    engine.buffer().text()[span.range()].to_string()
}

#[tokio::test]
async fn test_vertical_moves() {
    let mut engine = focused(STATEMENTS, "const a");

    assert_eq!(engine.replay("j").await, ModeExit::Cancelled);
    assert_eq!(engine.current_span(), Some(ByteSpan::new(13, 25)));
    assert_eq!(engine.host().selections().last(), Some(&ByteSpan::new(13, 25)));

    // Nothing below the last statement: focus stays
    engine.replay("j").await;
    assert_eq!(engine.current_span(), Some(ByteSpan::new(13, 25)));

    engine.replay("k").await;
    assert_eq!(engine.current_span(), Some(ByteSpan::new(0, 12)));
}

#[tokio::test]
async fn test_swap_follows_moved_node() {
    let mut engine = focused(STATEMENTS, "const a");

    engine.replay("J").await;
    assert_eq!(engine.buffer().text(), "const b = 2;\nconst a = 1;\n");
    assert_eq!(current_text(&mut engine), "const a = 1;");
    assert_eq!(engine.host().text(), engine.buffer().text());

    engine.replay("K").await;
    assert_eq!(engine.buffer().text(), STATEMENTS);
    assert_eq!(current_text(&mut engine), "const a = 1;");
}

#[tokio::test]
async fn test_swap_unequal_lengths() {
    let source = "foo();\nbarbaz();\n";
    let mut engine = focused(source, "foo");

    engine.replay("J").await;
    assert_eq!(engine.buffer().text(), "barbaz();\nfoo();\n");
    assert_eq!(current_text(&mut engine), "foo();");
}

#[tokio::test]
async fn test_parent_hint_selects_ancestor() {
    let source = "function f() {\n  return 1;\n}\n";
    let mut engine = focused(source, "return");

    // Ancestors, nearest first: statement_block, function_declaration, program
    engine.replay("ha").await;
    assert_eq!(current_text(&mut engine), "{\n  return 1;\n}");

    let host = engine.host();
    assert_eq!(host.hint_history().len(), 1);
    assert_eq!(host.hint_history()[0].len(), 3);
    assert_eq!(host.clear_count(), 1);
}

#[tokio::test]
async fn test_global_jump_by_label() {
    let source = "const a = 1;\nconst b = 2;\nconst c = 3;\n";
    let mut engine = focused(source, "const a");

    // Ranked from the cursor at the start of the first statement
    engine.replay("g;e").await;
    assert_eq!(current_text(&mut engine), "const c = 3;");
    assert_eq!(engine.host().clear_count(), 1);
}

#[tokio::test]
async fn test_jump_inside_current_node() {
    let source = "function f() {\n  a();\n  b();\n}\nc();\n";
    let mut engine = focused(source, "function");

    engine.replay("l;o").await;
    assert_eq!(current_text(&mut engine), "b();");

    let shown = &engine.host().hint_history()[0];
    let texts: Vec<&str> = shown.iter().map(|hint| &source[hint.span.range()]).collect();
    assert_eq!(texts, ["a();", "b();"]);
}

#[tokio::test]
async fn test_unmatched_label_keeps_focus() {
    let mut engine = focused(STATEMENTS, "const a");

    engine.replay("g;z").await;
    assert_eq!(current_text(&mut engine), "const a = 1;");
    assert_eq!(engine.host().clear_count(), 1);
}

#[tokio::test]
async fn test_replace_with_selected_node() {
    let mut engine = focused(STATEMENTS, "const a");

    engine.replay("r;o").await;
    assert_eq!(engine.buffer().text(), "const b = 2;\nconst b = 2;\n");
    assert_eq!(engine.current_span(), Some(ByteSpan::new(0, 12)));
}

#[tokio::test]
async fn test_wrap_block_template() {
    let source = "function f() {\n  run();\n}\n";
    let mut engine = focused(source, "run");

    engine.replay("wd").await;
    assert_eq!(
        engine.buffer().text(),
        "function f() {\n  if (condition) {\n    run();\n  }\n}\n"
    );
    assert_eq!(
        current_text(&mut engine),
        "if (condition) {\n    run();\n  }"
    );
}

#[tokio::test]
async fn test_unwrap_statement_block() {
    let source = "if (x) {\n  a();\n}\n";
    let mut engine = focused(source, "a()");

    engine.replay("W").await;
    assert_eq!(engine.buffer().text().trim(), "a();");
    assert_eq!(current_text(&mut engine), "a();");
}

#[tokio::test]
async fn test_unwrap_generic_parent() {
    let source = "x = (y + 1);\n";
    let mut engine = focused(source, "y");

    engine.replay("W").await;
    assert_eq!(engine.buffer().text(), "x = y + 1;\n");
    assert_eq!(current_text(&mut engine), "y + 1");
}

#[tokio::test]
async fn test_delete_removes_line_and_moves_down() {
    let source = "const a = 1;\nconst b = 2;\nconst c = 3;\n";
    let mut engine = focused(source, "const b");

    engine.replay("d").await;
    assert_eq!(engine.buffer().text(), "const a = 1;\nconst c = 3;\n");
    assert_eq!(current_text(&mut engine), "const c = 3;");
}

#[tokio::test]
async fn test_delete_last_moves_up() {
    let mut engine = focused(STATEMENTS, "const b");

    engine.replay("d").await;
    assert_eq!(engine.buffer().text(), "const a = 1;\n");
    assert_eq!(current_text(&mut engine), "const a = 1;");
}

#[tokio::test]
async fn test_change_exits_to_insert() {
    let mut engine = focused(STATEMENTS, "const a");

    assert_eq!(
        engine.replay("cj").await,
        ModeExit::Exited(ExitMode::Insert)
    );
    assert_eq!(engine.buffer().text(), "const b = 2;\n");
    assert_eq!(engine.host().exits(), [ExitMode::Insert]);
}

#[tokio::test]
async fn test_create_after_and_before() {
    let mut engine = focused(STATEMENTS, "const a");

    engine.replay("aC").await;
    assert_eq!(
        engine.buffer().text(),
        "const a = 1;\nconsole.log()\nconst b = 2;\n"
    );
    assert_eq!(current_text(&mut engine), "console.log()");

    let source = "  run();\n";
    let mut engine = focused(source, "run");
    engine.replay("Ac").await;
    assert_eq!(engine.buffer().text(), "  name()\n  run();\n");
    assert_eq!(current_text(&mut engine), "name()");
}

#[tokio::test]
async fn test_escape_exits_to_normal() {
    let mut engine = focused(STATEMENTS, "const a");
    let keys = format!("j{ESCAPE}j");

    assert_eq!(
        engine.replay(&keys).await,
        ModeExit::Exited(ExitMode::Normal)
    );
    // Keys after the exit are not handled
    assert_eq!(engine.current_span(), Some(ByteSpan::new(13, 25)));
}

#[tokio::test]
async fn test_rejected_edit_leaves_buffer_and_mode_running() {
    let host = RecordingHost::new(STATEMENTS).rejecting_edits();
    let mut engine = engine_with(host, STATEMENTS);
    assert!(engine.focus_at(0));

    engine.replay("dj").await;
    assert_eq!(engine.buffer().text(), STATEMENTS);
    assert_eq!(engine.current_span(), Some(ByteSpan::new(13, 25)));
}

#[tokio::test]
async fn test_external_edits_between_keys() {
    let mut engine = focused(STATEMENTS, "const b");
    let (tx, mut rx) = unbounded_channel();

    tx.send(InputEvent::Edits(vec![Replacement::insert(0, "// c\n")]))
        .unwrap();
    tx.send(InputEvent::Key('k')).unwrap();
    drop(tx);

    let exit = engine.run_mode(&mut rx, &CancellationToken::new()).await;
    assert_eq!(exit, ModeExit::Cancelled);
    assert_eq!(engine.buffer().text(), "// c\nconst a = 1;\nconst b = 2;\n");
    assert_eq!(engine.current_span(), Some(ByteSpan::new(5, 17)));
    assert_eq!(current_text(&mut engine), "const a = 1;");
}

#[tokio::test]
async fn test_external_edits_before_replace_pick() {
    // The host's document already holds the comment when it reports it
    let host = RecordingHost::new(format!("{COMMENT}{STATEMENTS}"));
    let mut engine = engine_with(host, STATEMENTS);
    assert!(engine.focus_at(STATEMENTS.find("const b").unwrap()));
    let (tx, mut rx) = unbounded_channel();

    tx.send(InputEvent::Key('r')).unwrap();
    tx.send(InputEvent::Edits(vec![Replacement::insert(0, COMMENT)]))
        .unwrap();
    tx.send(InputEvent::Key(';')).unwrap();
    // The cursor stays on row 1, now the first statement
    tx.send(InputEvent::Key('a')).unwrap();
    drop(tx);

    engine.run_mode(&mut rx, &CancellationToken::new()).await;
    assert_eq!(
        engine.buffer().text(),
        "// comment\nconst a = 1;\nconst a = 1;\n"
    );
    assert_eq!(engine.host().text(), engine.buffer().text());
    assert_eq!(engine.current_span(), Some(ByteSpan::new(24, 36)));
}

#[tokio::test]
async fn test_external_edits_before_wrap_key() {
    let host = RecordingHost::new(format!("{COMMENT}{STATEMENTS}"));
    let mut engine = engine_with(host, STATEMENTS);
    assert!(engine.focus_at(STATEMENTS.find('2').unwrap()));
    let (tx, mut rx) = unbounded_channel();

    tx.send(InputEvent::Key('w')).unwrap();
    tx.send(InputEvent::Edits(vec![Replacement::insert(0, COMMENT)]))
        .unwrap();
    tx.send(InputEvent::Key('C')).unwrap();
    drop(tx);

    engine.run_mode(&mut rx, &CancellationToken::new()).await;
    assert_eq!(
        engine.buffer().text(),
        "// comment\nconst a = 1;\nconst b = console.log(2);\n"
    );
    assert_eq!(current_text(&mut engine), "console.log(2)");
    assert_eq!(engine.host().text(), engine.buffer().text());
}

#[tokio::test]
async fn test_cancel_during_hint_session() {
    let mut engine = focused(STATEMENTS, "const a");
    let (tx, mut rx) = unbounded_channel();
    let cancel = CancellationToken::new();

    tx.send(InputEvent::Key('g')).unwrap();
    tx.send(InputEvent::Key(';')).unwrap();

    let canceller = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(20)).await;
        canceller.cancel();
    });

    let exit = engine.run_mode(&mut rx, &cancel).await;
    assert_eq!(exit, ModeExit::Cancelled);
    assert_eq!(engine.host().hint_history().len(), 1);
    assert_eq!(engine.host().clear_count(), 1);
    assert_eq!(current_text(&mut engine), "const a = 1;");
    drop(tx);
}

#[tokio::test]
async fn test_edit_interrupts_hint_session() {
    let mut engine = focused(STATEMENTS, "const a");
    let (tx, mut rx) = unbounded_channel();

    tx.send(InputEvent::Key('g')).unwrap();
    tx.send(InputEvent::Key(';')).unwrap();
    tx.send(InputEvent::Edits(vec![Replacement::new(6, 7, "alpha")]))
        .unwrap();
    // Would pick the second statement if the session were still open
    tx.send(InputEvent::Key('o')).unwrap();
    drop(tx);

    engine.run_mode(&mut rx, &CancellationToken::new()).await;
    assert_eq!(engine.buffer().text(), "const alpha = 1;\nconst b = 2;\n");
    assert_eq!(engine.host().clear_count(), 1);
    assert_eq!(current_text(&mut engine), "const alpha = 1;");
}

#[tokio::test]
async fn test_scenario_anchor_survives_rename() {
    let source = "const a = 1;\nconst b = 2;\nconst c = 3;";
    let mut engine = focused(source, "const b");

    engine.apply_external(vec![Replacement::new(0, 12, "fooo;")]);
    assert_eq!(engine.current_span(), Some(ByteSpan::new(6, 18)));
    assert_eq!(current_text(&mut engine), "const b = 2;");

    engine.replay("j").await;
    assert_eq!(current_text(&mut engine), "const c = 3;");
}
