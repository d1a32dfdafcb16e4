// Declare the display submodule
mod display;

// Declare the shell submodule (containing the shell_loop logic)
mod shell;

// Declare the command_handlers module
mod command_handlers;

// Re-export the public function from the shell submodule
pub use shell::{parse_command, shell_loop, Command};
