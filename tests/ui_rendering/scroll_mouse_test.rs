use anyhow::Result;
use crossterm::event::{KeyCode, MouseEventKind};
use mentor_nusantara::cli::test_support::{ScriptedTurn, UiHarness};

use crate::common::{new_harness, press, scroll, submit_line, timeline_snapshot};

async fn harness_with_turns(count: usize) -> Result<UiHarness> {
    let turns = (1..=count + 1)
        .map(|index| ScriptedTurn::answer(&format!("jawaban nomor {index}")))
        .collect();
    let mut harness = new_harness(60, 12, turns)?;
    for index in 1..=count {
        submit_line(&mut harness, &format!("pertanyaan {index}")).await?;
    }
    Ok(harness)
}

#[tokio::test]
async fn long_timeline_sticks_to_the_latest_message() -> Result<()> {
    let harness = harness_with_turns(6).await?;

    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("mentor> jawaban nomor 6"));
    assert!(!timeline.contains("kamu> pertanyaan 1"));
    assert_eq!(harness.ui_state_view().scroll_back, 0);
    Ok(())
}

#[tokio::test]
async fn mouse_wheel_scrolls_three_lines() -> Result<()> {
    let mut harness = harness_with_turns(6).await?;

    scroll(&mut harness, MouseEventKind::ScrollUp, 5, 5)?;
    assert_eq!(harness.ui_state_view().scroll_back, 3);
    let timeline = timeline_snapshot(&harness)?;
    assert!(timeline.contains("jawaban nomor 3"));
    assert!(!timeline.contains("jawaban nomor 6"));

    scroll(&mut harness, MouseEventKind::ScrollDown, 5, 5)?;
    assert_eq!(harness.ui_state_view().scroll_back, 0);
    Ok(())
}

#[tokio::test]
async fn page_keys_clamp_to_the_top_and_bottom() -> Result<()> {
    let mut harness = harness_with_turns(6).await?;

    press(&mut harness, KeyCode::PageUp).await?;
    press(&mut harness, KeyCode::PageUp).await?;
    assert_eq!(harness.ui_state_view().scroll_back, 10);
    assert!(timeline_snapshot(&harness)?.starts_with("kamu> pertanyaan 1"));

    press(&mut harness, KeyCode::PageDown).await?;
    assert_eq!(harness.ui_state_view().scroll_back, 3);
    press(&mut harness, KeyCode::PageDown).await?;
    assert_eq!(harness.ui_state_view().scroll_back, 0);
    Ok(())
}

#[tokio::test]
async fn new_message_jumps_back_to_the_bottom() -> Result<()> {
    let mut harness = harness_with_turns(6).await?;
    press(&mut harness, KeyCode::PageUp).await?;
    assert_ne!(harness.ui_state_view().scroll_back, 0);

    submit_line(&mut harness, "pertanyaan 7").await?;

    assert_eq!(harness.ui_state_view().scroll_back, 0);
    assert!(timeline_snapshot(&harness)?.contains("mentor> jawaban nomor 7"));
    Ok(())
}
