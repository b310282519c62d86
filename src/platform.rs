use std::process::Command;

/// Platform-specific command construction
pub trait PlatformExecutor {
    /// Build a shell command for executing a script string
    fn build_shell_command(&self, script: &str) -> Command;

    /// Build a shell command that runs `script` with `arg` appended as its
    /// final argument, without the argument being re-parsed by the shell.
    fn build_command_with_arg(&self, script: &str, arg: &str) -> Command;
}

#[derive(Debug, Default)]
pub struct UnixExecutor;

impl PlatformExecutor for UnixExecutor {
    fn build_shell_command(&self, script: &str) -> Command {
        let mut cmd = Command::new("sh");
        cmd.arg("-c").arg(script);
        cmd
    }

    fn build_command_with_arg(&self, script: &str, arg: &str) -> Command {
        // "$1" expands to the positional parameter after $0
        let mut cmd = Command::new("sh");
        cmd.arg("-c")
            .arg(format!("{} \"$1\"", script))
            .arg("odb-devtools")
            .arg(arg);
        cmd
    }
}

#[derive(Debug, Default)]
pub struct WindowsExecutor;

/// cmd.exe parses the line after `/C` itself; it is passed through verbatim.
fn cmd_command(line: String) -> Command {
    let mut cmd = Command::new("cmd");
    cmd.arg("/C");
    #[cfg(windows)]
    {
        use std::os::windows::process::CommandExt;
        cmd.raw_arg(line);
    }
    #[cfg(not(windows))]
    {
        cmd.arg(line);
    }
    cmd
}

impl PlatformExecutor for WindowsExecutor {
    fn build_shell_command(&self, script: &str) -> Command {
        cmd_command(script.to_string())
    }

    fn build_command_with_arg(&self, script: &str, arg: &str) -> Command {
        cmd_command(format!("{} \"{}\"", script, arg))
    }
}

pub fn current_executor() -> Box<dyn PlatformExecutor> {
    if cfg!(windows) {
        Box::new(WindowsExecutor)
    } else {
        Box::new(UnixExecutor)
    }
}
