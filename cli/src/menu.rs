//! Interactive numbered menu.
//!
//! Reads one choice per line until the operator picks "Exit", stdin reaches
//! EOF, or Ctrl-C arrives at a prompt. Request failures are logged and the
//! menu is shown again; nothing here ends the session except those three.
//!
//! Ctrl-C during a request abandons it, whether it is still waiting for a
//! permit or already in flight, and returns to the menu.

use std::future::Future;
use std::io::{self, Write};
use std::path::Path;

use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use euvd_client::Fetcher;
use euvd_client::euvd_types::NonEmptyString;

use crate::request::{self, Request};

const MENU: &str = "\n=== EUVD Tool Menu ===
1. Show Latest Vulnerabilities
2. Show Exploited Vulnerabilities
3. Show Critical Vulnerabilities
4. Search by CVE ID
5. Search by ENISA ID
6. Search by Advisory ID
7. Search vulnerabilities by text
8. Run full self-test
9. Exit
";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Choice {
    Latest,
    Exploited,
    Critical,
    Cve,
    Enisa,
    Advisory,
    Search,
    SelfTest,
    Exit,
}

impl Choice {
    fn parse(input: &str) -> Option<Self> {
        Some(match input.trim() {
            "1" => Self::Latest,
            "2" => Self::Exploited,
            "3" => Self::Critical,
            "4" => Self::Cve,
            "5" => Self::Enisa,
            "6" => Self::Advisory,
            "7" => Self::Search,
            "8" => Self::SelfTest,
            "9" => Self::Exit,
            _ => return None,
        })
    }

    fn prompt(self) -> Option<&'static str> {
        match self {
            Self::Cve => Some("Enter CVE ID (e.g., CVE-2024-0864): "),
            Self::Enisa => Some("Enter ENISA ID (e.g., EUVD-2024-45012): "),
            Self::Advisory => Some("Enter Advisory ID (e.g., cisco-sa-ata19x-multi-RDTEqRsy): "),
            Self::Search => Some("Enter text to search: "),
            _ => None,
        }
    }
}

enum Step {
    Continue,
    Exit,
}

pub struct Menu<'a, R, W, I> {
    fetcher: &'a Fetcher,
    report_path: &'a Path,
    input: R,
    out: W,
    interrupt: I,
}

impl<'a, R, W, I, Fut> Menu<'a, R, W, I>
where
    R: AsyncBufRead + Unpin,
    W: Write,
    I: Fn() -> Fut,
    Fut: Future<Output = ()>,
{
    /// `interrupt` is called once per wait and should resolve on Ctrl-C.
    pub fn new(fetcher: &'a Fetcher, report_path: &'a Path, input: R, out: W, interrupt: I) -> Self {
        Self {
            fetcher,
            report_path,
            input,
            out,
            interrupt,
        }
    }

    pub async fn run(mut self) -> io::Result<()> {
        loop {
            self.out.write_all(MENU.as_bytes())?;
            let Some(line) = self.prompt("Select an option: ").await? else {
                writeln!(self.out)?;
                return Ok(());
            };

            let Some(choice) = Choice::parse(&line) else {
                writeln!(self.out, "Invalid option.")?;
                continue;
            };

            if let Step::Exit = self.dispatch(choice).await? {
                return Ok(());
            }
        }
    }

    async fn dispatch(&mut self, choice: Choice) -> io::Result<Step> {
        let request = match choice {
            Choice::Exit => {
                writeln!(self.out, "Exiting...")?;
                return Ok(Step::Exit);
            }
            Choice::SelfTest => {
                request::self_test(self.fetcher, self.report_path, (self.interrupt)()).await;
                return Ok(Step::Continue);
            }
            Choice::Latest => Request::Latest,
            Choice::Exploited => Request::Exploited,
            Choice::Critical => Request::Critical,
            Choice::Cve | Choice::Enisa | Choice::Advisory | Choice::Search => {
                let prompt = choice.prompt().unwrap_or_default();
                let Some(line) = self.prompt(prompt).await? else {
                    writeln!(self.out)?;
                    return Ok(Step::Exit);
                };
                let Ok(value) = NonEmptyString::new(line) else {
                    writeln!(self.out, "Input must not be empty.")?;
                    return Ok(Step::Continue);
                };
                match choice {
                    Choice::Cve => Request::Cve(value),
                    Choice::Enisa => Request::Enisa(value),
                    Choice::Advisory => Request::Advisory(value),
                    _ => Request::Search(value),
                }
            }
        };

        if let Err(err) = request
            .run(self.fetcher, &mut self.out, (self.interrupt)())
            .await
        {
            tracing::error!("Error: {err:#}");
        }
        Ok(Step::Continue)
    }

    /// Print `prompt` and read one line. `None` on EOF or interrupt.
    async fn prompt(&mut self, prompt: &str) -> io::Result<Option<String>> {
        self.out.write_all(prompt.as_bytes())?;
        self.out.flush()?;

        let mut line = String::new();
        let read = tokio::select! {
            read = self.input.read_line(&mut line) => read?,
            () = (self.interrupt)() => return Ok(None),
        };
        if read == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }
}
