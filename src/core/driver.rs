use crate::core::command::Mode;
use crate::core::exchange::Direction;
use crate::core::exchange::Registry;
use crate::core::profile::PollPolicy;
use crate::error::Error;
use crate::error::Hint;
use crate::error::LastError;
use crate::util::filesystem;

/// The lifecycle of a single simulation run.
///
/// `Complete` and `Failed` are terminal; a new run takes a fresh `Driver`.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum RunState {
    Idle,
    AwaitingInputs,
    Executing,
    AwaitingOutputs,
    Complete,
    Failed,
}

/// Executes one assembled simulator command against a registry of exchange
/// files, blocking the calling thread for the simulator's full runtime.
#[derive(Debug, PartialEq)]
pub struct Driver {
    mode: Mode,
    policy: PollPolicy,
    state: RunState,
}

impl Driver {
    pub fn new(mode: Mode, policy: PollPolicy) -> Self {
        Self {
            mode,
            policy,
            state: RunState::Idle,
        }
    }

    pub fn get_state(&self) -> RunState {
        self.state
    }

    /// Performs the full run sequence:
    /// 1. wait for every input exchange file to exist,
    /// 2. drop stale output files from an earlier run,
    /// 3. execute `command` synchronously through the shell,
    /// 4. wait for every output exchange file to exist.
    ///
    /// The caller is responsible for `read`ing each output descriptor
    /// afterwards.
    pub fn run(&mut self, command: &str, registry: &Registry) -> Result<(), Error> {
        if self.state != RunState::Idle {
            return Err(Error::DriverSpent);
        }

        self.state = RunState::AwaitingInputs;
        for desc in registry.iter() {
            if desc.get_direction() == Direction::Input {
                if filesystem::poll_until_present(desc.get_path(), &self.policy) == false {
                    self.state = RunState::Failed;
                    return Err(Error::InfileTimeout(
                        desc.get_path().clone(),
                        self.policy.get_timeout_sec(),
                        Hint::WriteBeforeRun,
                    ));
                }
            }
        }

        // stale results from an earlier run must not satisfy the output poll
        for desc in registry.iter() {
            if desc.get_direction() == Direction::Output {
                filesystem::remove_if_exists(desc.get_path());
            }
        }

        self.state = RunState::Executing;
        println!("info: running external command: {}", command);
        if self.mode == Mode::Interactive {
            println!(
                "info: running simulation in interactive mode; add probes as \
                 you wish, then run the simulation to the end and exit to finish"
            );
        }
        let proc = match std::process::Command::new("sh")
            .arg("-c")
            .arg(command)
            .output()
        {
            Ok(p) => p,
            Err(e) => {
                self.state = RunState::Failed;
                return Err(Error::SimProcFailed(LastError(e.to_string())));
            }
        };
        match proc.status.code() {
            Some(0) => (),
            Some(num) => {
                self.state = RunState::Failed;
                let captured = format!(
                    "{}{}",
                    String::from_utf8_lossy(&proc.stdout),
                    String::from_utf8_lossy(&proc.stderr)
                );
                return Err(Error::SimProcErrorCode(num, LastError(captured)));
            }
            None => {
                self.state = RunState::Failed;
                return Err(Error::SimProcTerminated);
            }
        }

        self.state = RunState::AwaitingOutputs;
        for desc in registry.iter() {
            if desc.get_direction() == Direction::Output {
                if filesystem::poll_until_present(desc.get_path(), &self.policy) == false {
                    self.state = RunState::Failed;
                    return Err(Error::OutfileTimeout(
                        desc.get_path().clone(),
                        self.policy.get_timeout_sec(),
                    ));
                }
            }
        }

        self.state = RunState::Complete;
        Ok(())
    }
}
