use crate::app::screen::MainScreen;
use crate::core::samples::SampleKind;
use crate::domain::ports::{DisplaySurface, OutputEvent};
use crate::utils::error::Result;
use std::io::Write;
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Renders output events straight to stdout. A replaced line is redrawn in place.
#[derive(Debug, Default)]
pub struct TerminalDisplay {
    has_content: bool,
    line_open: bool,
}

impl DisplaySurface for TerminalDisplay {
    fn render(&mut self, event: &OutputEvent) {
        let mut stdout = std::io::stdout().lock();
        let written = match event {
            OutputEvent::Append(text) => {
                let prefix = if self.line_open { "\n" } else { "" };
                self.line_open = false;
                self.has_content = true;
                writeln!(stdout, "{}{}", prefix, text)
            }
            OutputEvent::ReplaceLast(text) => {
                // 游標在空行上時先回到上一行
                let up = if self.has_content && !self.line_open { "\x1b[1A" } else { "" };
                self.line_open = true;
                self.has_content = true;
                write!(stdout, "{}\r\x1b[2K{}", up, text)
            }
            OutputEvent::Clear => {
                self.line_open = false;
                self.has_content = false;
                write!(stdout, "\x1b[2J\x1b[H")
            }
        };
        if let Err(e) = written.and_then(|_| stdout.flush()) {
            tracing::warn!("terminal write failed: {}", e);
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserInput {
    Command(String),
    Vocabulary(String),
    FetchPosts,
    Tap,
    Quit,
}

impl UserInput {
    pub fn parse(line: &str) -> Self {
        let line = line.trim_end_matches(['\r', '\n']);
        match line {
            "" => UserInput::Tap,
            ":quit" | ":q" => UserInput::Quit,
            "!posts" => UserInput::FetchPosts,
            _ => match line.strip_prefix('?') {
                Some(prefix) => UserInput::Vocabulary(prefix.trim().to_string()),
                None => UserInput::Command(line.trim().to_string()),
            },
        }
    }
}

pub const PROMPT_HELP: &str = "type a command name, ?prefix to look up words, !posts to fetch posts, \
an empty line to tap the output (twice quickly clears it), :quit to exit";

/// Reads stdin until EOF or `:quit`, feeding the screen.
pub async fn run_interactive(screen: &MainScreen) -> Result<()> {
    println!("{}", PROMPT_HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match UserInput::parse(&line) {
            UserInput::Quit => break,
            UserInput::Command(text) => screen.type_command(text).await,
            UserInput::FetchPosts => screen.click_fetch().await,
            UserInput::Tap => screen.tap_output().await,
            UserInput::Vocabulary(prefix) => match screen.find_vocabulary(&prefix).await {
                Ok(words) => println!("words: {}", words.join(", ")),
                Err(e) => tracing::error!("❌ Vocabulary lookup failed: {}", e),
            },
        }
    }

    screen.close();
    Ok(())
}

/// Runs one sample for `duration`, then returns the output and closes the screen.
pub async fn run_single(screen: &MainScreen, kind: SampleKind, duration: Duration) -> Vec<String> {
    screen.dispatcher().dispatch(kind.name());
    tokio::time::sleep(duration).await;
    // 先等輸出排空，關閉會讓尚未處理的樣本寫入失效
    screen.output().sync().await;
    let lines = screen.output().lines();
    screen.close();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_user_input() {
        assert_eq!(UserInput::parse(""), UserInput::Tap);
        assert_eq!(UserInput::parse(":quit"), UserInput::Quit);
        assert_eq!(UserInput::parse("!posts"), UserInput::FetchPosts);
        assert_eq!(UserInput::parse("?Lo "), UserInput::Vocabulary("Lo".to_string()));
        assert_eq!(UserInput::parse("timer\n"), UserInput::Command("timer".to_string()));
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_single_keeps_final_lines_and_closes() {
        use crate::adapters::FakeDataProvider;
        use crate::config::AppConfig;
        use crate::domain::ports::NullDisplay;
        use std::sync::Arc;

        let provider = Arc::new(FakeDataProvider::new(Duration::ZERO));
        let screen = MainScreen::open(AppConfig::default(), provider, NullDisplay).unwrap();

        let lines = run_single(&screen, SampleKind::ErrorFallback, Duration::from_millis(100)).await;

        assert_eq!(lines, vec!["10 / 2 = 5 -> 50", "10 / 0 failed, fell back to 1 -> 10"]);
        assert!(screen.is_closed());
    }
}
