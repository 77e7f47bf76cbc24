use anyhow::Result;
use mentor_nusantara::agent::AgentError;
use mentor_nusantara::cli::test_support::ScriptedTurn;

use crate::common::{
    input_snapshot, new_harness, press_ctrl, status_snapshot, submit_line, timeline_snapshot,
    type_text,
};

#[tokio::test]
async fn tool_turn_renders_user_trace_and_mentor_bubbles() -> Result<()> {
    let mut harness = new_harness(
        60,
        12,
        vec![ScriptedTurn::tool_then_answer(
            "multiply",
            "a=15000;b=40",
            "Modal awal Rp600.000.",
        )],
    )?;

    submit_line(&mut harness, "Hitung modal").await?;

    insta::assert_snapshot!(timeline_snapshot(&harness)?, @r"
    kamu> Hitung modal
      ┃ Menggunakan Alat: multiply
      ┃ a=15000;b=40
    mentor> Modal awal Rp600.000.
    ");
    Ok(())
}

#[tokio::test]
async fn input_line_shows_placeholder_until_typing() -> Result<()> {
    let mut harness = new_harness(60, 12, vec![])?;
    assert_eq!(
        input_snapshot(&harness)?,
        "> Ceritakan masalah bisnismu atau tanyakan sejarah..."
    );

    type_text(&mut harness, "modal usaha").await?;
    assert_eq!(input_snapshot(&harness)?, "> modal usaha");
    assert_eq!(harness.ui_state_view().input, "modal usaha");
    Ok(())
}

#[tokio::test]
async fn status_line_tracks_tool_trace_visibility() -> Result<()> {
    let mut harness = new_harness(100, 12, vec![])?;
    let status = status_snapshot(&harness)?;
    assert!(status.starts_with("sesi ui-harness | executor-"), "{status}");
    assert!(status.contains("alat: tampil"));

    press_ctrl(&mut harness, 't').await?;
    assert!(status_snapshot(&harness)?.contains("alat: sembunyi"));
    Ok(())
}

#[tokio::test]
async fn failed_turn_keeps_trace_and_shows_fallback() -> Result<()> {
    let mut harness = new_harness(
        120,
        12,
        vec![ScriptedTurn::fails_after_tool(
            "get_weather",
            "lat=-6.2;lon=106.8",
            AgentError::StepTimeout(60_000),
        )],
    )?;

    submit_line(&mut harness, "Cuaca Jakarta?").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("┃ Menggunakan Alat: get_weather"));
    assert!(timeline.contains(
        "mentor> Maaf, mentor sedang pusing (Error: model call exceeded the 60000 ms step timeout)"
    ));
    assert_eq!(harness.ui_state_view().history_len, 3);
    Ok(())
}

#[tokio::test]
async fn help_command_lists_commands_without_a_turn() -> Result<()> {
    let mut harness = new_harness(100, 20, vec![])?;

    submit_line(&mut harness, "/help").await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.starts_with("Available commands:"));
    assert!(timeline.contains("/steps [on|off]"));
    assert_eq!(harness.ui_state_view().history_len, 0);
    Ok(())
}
