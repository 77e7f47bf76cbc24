use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers, MouseEvent, MouseEventKind};
use mentor_nusantara::cli::test_support::{ScriptedTurn, UiHarness};
use ratatui::layout::Rect;

pub fn new_harness(width: u16, height: u16, turns: Vec<ScriptedTurn>) -> Result<UiHarness> {
    let mut harness = UiHarness::new(width, height, turns)?;
    harness.render()?;
    Ok(harness)
}

pub async fn type_text(harness: &mut UiHarness, text: &str) -> Result<()> {
    for ch in text.chars() {
        harness
            .send_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::NONE))
            .await?;
    }
    Ok(())
}

pub async fn submit_line(harness: &mut UiHarness, line: &str) -> Result<()> {
    type_text(harness, line).await?;
    press(harness, KeyCode::Enter).await
}

pub async fn press(harness: &mut UiHarness, code: KeyCode) -> Result<()> {
    harness.send_key(KeyEvent::new(code, KeyModifiers::NONE)).await
}

pub async fn press_ctrl(harness: &mut UiHarness, ch: char) -> Result<()> {
    harness
        .send_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
        .await
}

pub fn scroll(harness: &mut UiHarness, kind: MouseEventKind, column: u16, row: u16) -> Result<()> {
    harness.send_mouse(MouseEvent {
        kind,
        column,
        row,
        modifiers: KeyModifiers::NONE,
    })
}

pub fn normalized_text(text: &str) -> String {
    text.replace("\r\n", "\n")
        .lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
        .trim_end()
        .to_string()
}

pub fn region_text(harness: &UiHarness, area: Rect) -> String {
    let lines = harness.buffer_lines();
    let start_row = usize::from(area.y);
    let end_row = start_row.saturating_add(usize::from(area.height));

    let mut rendered = Vec::new();
    for line in lines.iter().take(end_row.min(lines.len())).skip(start_row) {
        let clipped = line
            .chars()
            .skip(usize::from(area.x))
            .take(usize::from(area.width))
            .collect::<String>();
        rendered.push(clipped);
    }

    normalized_text(&rendered.join("\n"))
}

pub fn timeline_snapshot(harness: &UiHarness) -> Result<String> {
    let regions = harness.regions()?;
    Ok(region_text(harness, regions.timeline))
}

pub fn input_snapshot(harness: &UiHarness) -> Result<String> {
    let regions = harness.regions()?;
    Ok(region_text(harness, regions.input))
}

pub fn status_snapshot(harness: &UiHarness) -> Result<String> {
    let regions = harness.regions()?;
    Ok(region_text(harness, regions.status))
}
