use dialoguer::Confirm;
use skillgate_core::gate;

/// Asks on stderr's terminal. dialoguer fails when stderr is not attended,
/// and the gate treats that failure as a decline.
pub struct TerminalConfirm;

impl gate::Confirm for TerminalConfirm {
    fn confirm(&mut self, prompt: &str) -> anyhow::Result<bool> {
        let answer = Confirm::new()
            .with_prompt(prompt)
            .default(false)
            .interact()?;
        Ok(answer)
    }
}
