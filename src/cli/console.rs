use anyhow::Context;
use async_trait::async_trait;
use colored::*;
use std::io::{self, Write};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};

use crate::gate::Operator;

/// Console handles all terminal I/O with colored formatting
pub struct Console {
    prompt_color: Color,
    input: Box<dyn AsyncBufRead + Send + Unpin>,
}

impl Console {
    /// Create a new Console reading from stdin
    pub fn new() -> Self {
        Self::with_reader(BufReader::new(tokio::io::stdin()))
    }

    /// Create a Console reading lines from an arbitrary source
    pub fn with_reader(reader: impl AsyncBufRead + Send + Unpin + 'static) -> Self {
        Self {
            prompt_color: Color::Cyan,
            input: Box::new(reader),
        }
    }

    /// Print the final answer
    pub fn print_answer(answer: &str) {
        println!("\n{} {}", "最终答案:".green().bold(), answer);
    }

    /// Print a fatal error
    pub fn print_error(error: &str) {
        eprintln!("{} {}", "运行失败:".red().bold(), error);
    }

    /// Print a system message
    pub fn print_system(&self, message: &str) {
        println!("{}", message.yellow());
    }

    /// Read one line, without the line terminator
    ///
    /// End of input is `UnexpectedEof`.
    pub async fn read_input(&mut self, prompt: &str) -> io::Result<String> {
        print!("{}", prompt.color(self.prompt_color).bold());
        io::stdout().flush()?;

        let mut line = String::new();
        let read = self.input.read_line(&mut line).await?;
        if read == 0 {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "标准输入已关闭",
            ));
        }
        Ok(line.trim_end_matches(['\r', '\n']).to_string())
    }

    /// Use `given` as the task, or ask for one when it is blank
    ///
    /// A blank answer is an error.
    pub async fn read_question(&mut self, given: &str) -> anyhow::Result<String> {
        let given = given.trim();
        if !given.is_empty() {
            return Ok(given.to_string());
        }

        let answer = self.read_input("请输入任务: ").await.context("读取输入失败")?;
        let answer = answer.trim();
        if answer.is_empty() {
            anyhow::bail!("问题不能为空");
        }
        Ok(answer.to_string())
    }
}

impl Default for Console {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Operator for Console {
    async fn read_line(&mut self, prompt: &str) -> io::Result<String> {
        self.read_input(prompt).await
    }

    fn notify(&mut self, message: &str) {
        self.print_system(message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gate;
    use crate::helpers::Transcript;

    #[tokio::test]
    async fn test_reads_lines_until_eof() {
        let mut console = Console::with_reader(&b"first\r\nsecond\n"[..]);
        assert_eq!(console.read_input("> ").await.unwrap(), "first");
        assert_eq!(console.read_input("> ").await.unwrap(), "second");

        let err = console.read_input("> ").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::UnexpectedEof);
    }

    #[tokio::test]
    async fn test_question_from_flag_skips_stdin() {
        let mut console = Console::with_reader(&b"unused\n"[..]);
        assert_eq!(console.read_question("  统计订单数  ").await.unwrap(), "统计订单数");
        assert_eq!(console.read_input("> ").await.unwrap(), "unused");
    }

    #[tokio::test]
    async fn test_question_read_from_stdin() {
        let mut console = Console::with_reader(&b"  list the tables \n"[..]);
        assert_eq!(console.read_question("").await.unwrap(), "list the tables");
    }

    #[tokio::test]
    async fn test_blank_question_is_an_error() {
        let mut console = Console::with_reader(&b"   \n"[..]);
        let err = console.read_question(" ").await.unwrap_err();
        assert_eq!(err.to_string(), "问题不能为空");

        let mut console = Console::with_reader(&b""[..]);
        let err = console.read_question("").await.unwrap_err();
        assert_eq!(err.to_string(), "读取输入失败");
    }

    #[tokio::test]
    async fn test_console_as_operator() {
        let mut console = Console::with_reader(&b"y\n\n  more info \n"[..]);
        assert!(gate::confirm(&mut console).await.unwrap());

        let answer = gate::request_user_input(&mut console, &Transcript::disabled(), &[])
            .await
            .unwrap();
        assert_eq!(answer, "more info");
    }
}
