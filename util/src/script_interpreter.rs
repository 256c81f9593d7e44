//! # Motion script interpreter module
//!
//! This module provides an interpreter for time-tagged command scripts,
//! allowing commands to be issued at fixed times after the start of a run.
//!
//! A script is made of lines like:
//!
//! ```text
//! 0.5: {"Go": {"direction": "Forward", "speed": 120}};
//! ```
//!
//! where the number is the execution time in seconds and the payload is the
//! JSON form of the command type the interpreter was created for.

// ---------------------------------------------------------------------------
// IMPORTS
// ---------------------------------------------------------------------------

// External
use regex::RegexBuilder;
use serde::de::DeserializeOwned;
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

// ---------------------------------------------------------------------------
// DATA STRUCTURES
// ---------------------------------------------------------------------------

/// A command which is scripted to occur at a specific time.
struct Command<T> {
    /// The time the command is supposed to execute at
    exec_time_s: f64,

    /// The command to run
    cmd: T,
}

/// A script interpreter.
///
/// After initialising with the path to the script to run use
/// `.get_pending_cmds` to acquire a list of commands that need executing.
pub struct ScriptInterpreter<T> {
    script_path: Option<PathBuf>,
    cmds: VecDeque<Command<T>>,
}

// ---------------------------------------------------------------------------
// ENUMERATIONS
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum ScriptError {
    #[error("Could not find the script at {0}")]
    ScriptNotFound(String),

    #[error("Could not load the script: {0}")]
    ScriptLoadError(std::io::Error),

    #[error("The script is empty (or is so bad it can't be read)")]
    ScriptEmpty,

    #[error(
        "Script contains an invalid timestamp: {0}. \
        Should be a float (like 1.0)"
    )]
    InvalidTimestamp(String),

    #[error("Script contains an invalid command at {0} s: {1}")]
    InvalidCmd(f64, serde_json::Error),

    #[error("Script timestamps must not decrease, found {1} s after {0} s")]
    OutOfOrder(f64, f64),
}

/// Commands which are due for execution.
#[derive(Debug, PartialEq)]
pub enum PendingCmds<T> {
    None,
    Some(Vec<T>),
    EndOfScript,
}

// ---------------------------------------------------------------------------
// IMPLEMENTATIONS
// ---------------------------------------------------------------------------

impl<T> ScriptInterpreter<T>
where
    T: DeserializeOwned,
{
    /// Create a new interpreter from the given script path.
    pub fn new<P: AsRef<Path>>(script_path: P) -> Result<Self, ScriptError> {
        let path = PathBuf::from(script_path.as_ref());

        if !path.exists() {
            return Err(ScriptError::ScriptNotFound(
                path.to_string_lossy().into_owned(),
            ));
        }

        let script = fs::read_to_string(&path).map_err(ScriptError::ScriptLoadError)?;

        let mut si = Self::from_script(&script)?;
        si.script_path = Some(path);

        Ok(si)
    }

    /// Create a new interpreter from the contents of a script.
    pub fn from_script(script: &str) -> Result<Self, ScriptError> {
        let mut cmd_queue: VecDeque<Command<T>> = VecDeque::new();

        // Go through the script executing __the magic regex__.
        let re = RegexBuilder::new(r"^\s*(\d+(\.\d+)?)\s*:\s*([^;]*);")
            .multi_line(true)
            .build()
            .map_err(|_| ScriptError::ScriptEmpty)?;

        for cap in re.captures_iter(script) {
            let (time_str, payload) = match (cap.get(1), cap.get(3)) {
                (Some(t), Some(p)) => (t.as_str(), p.as_str()),
                _ => continue,
            };

            let exec_time_s: f64 = time_str
                .parse()
                .map_err(|e| ScriptError::InvalidTimestamp(format!("{}", e)))?;

            if let Some(last) = cmd_queue.back() {
                if exec_time_s < last.exec_time_s {
                    return Err(ScriptError::OutOfOrder(last.exec_time_s, exec_time_s));
                }
            }

            let cmd = serde_json::from_str(payload)
                .map_err(|e| ScriptError::InvalidCmd(exec_time_s, e))?;

            cmd_queue.push_back(Command { exec_time_s, cmd });
        }

        if cmd_queue.is_empty() {
            return Err(ScriptError::ScriptEmpty);
        }

        Ok(ScriptInterpreter {
            script_path: None,
            cmds: cmd_queue,
        })
    }
}

impl<T> ScriptInterpreter<T> {
    /// Return all commands whose execution time has passed at `current_time_s`.
    pub fn get_pending_cmds(&mut self, current_time_s: f64) -> PendingCmds<T> {
        if self.cmds.is_empty() {
            return PendingCmds::EndOfScript;
        }

        let mut cmd_vec: Vec<T> = vec![];

        while let Some(front) = self.cmds.front() {
            if front.exec_time_s > current_time_s {
                break;
            }
            if let Some(c) = self.cmds.pop_front() {
                cmd_vec.push(c.cmd);
            }
        }

        if cmd_vec.is_empty() {
            PendingCmds::None
        } else {
            PendingCmds::Some(cmd_vec)
        }
    }

    /// Get the number of commands left in the script
    pub fn get_num_cmds(&self) -> usize {
        self.cmds.len()
    }

    /// Get the length of the script in seconds
    pub fn get_duration(&self) -> f64 {
        match self.cmds.back() {
            Some(c) => c.exec_time_s,
            None => 0f64,
        }
    }

    /// Path the script was loaded from, if it came from a file.
    pub fn script_path(&self) -> Option<&Path> {
        self.script_path.as_deref()
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_pending_cmds() {
        let script = "\
            0.0: 1;\n\
            0.5: 2;\n\
            0.5: 3;\n\
            # comments and blank lines are skipped\n\
            \n\
            2: 4;\n";

        let mut si: ScriptInterpreter<u32> = ScriptInterpreter::from_script(script).unwrap();
        assert_eq!(si.get_num_cmds(), 4);
        assert_eq!(si.get_duration(), 2.0);

        assert_eq!(si.get_pending_cmds(0.1), PendingCmds::Some(vec![1]));
        assert_eq!(si.get_pending_cmds(0.2), PendingCmds::None);
        assert_eq!(si.get_pending_cmds(1.0), PendingCmds::Some(vec![2, 3]));
        assert_eq!(si.get_pending_cmds(3.0), PendingCmds::Some(vec![4]));
        assert_eq!(si.get_pending_cmds(4.0), PendingCmds::EndOfScript);
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join("moti_script_interpreter_test.mts");
        fs::write(&path, "0.0: 7;\n1.5: 8;\n").unwrap();

        let si: ScriptInterpreter<u32> = ScriptInterpreter::new(&path).unwrap();
        assert_eq!(si.script_path(), Some(path.as_path()));
        assert_eq!(si.get_duration(), 1.5);

        let inline: ScriptInterpreter<u32> = ScriptInterpreter::from_script("0.0: 7;").unwrap();
        assert_eq!(inline.script_path(), None);

        fs::remove_file(&path).ok();
    }

    #[test]
    fn test_bad_scripts() {
        assert!(matches!(
            ScriptInterpreter::<u32>::from_script("nothing to see"),
            Err(ScriptError::ScriptEmpty)
        ));
        assert!(matches!(
            ScriptInterpreter::<u32>::from_script("1.0: \"not a number\";"),
            Err(ScriptError::InvalidCmd(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::<u32>::from_script("2.0: 1;\n1.0: 2;"),
            Err(ScriptError::OutOfOrder(_, _))
        ));
        assert!(matches!(
            ScriptInterpreter::<u32>::new("/definitely/not/a/script.mts"),
            Err(ScriptError::ScriptNotFound(_))
        ));
    }
}
