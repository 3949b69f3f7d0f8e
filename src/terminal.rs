use sbm_client::Presenter;
use sbm_common::form::serialize_form;
use sbm_common::view::{BootConfigView, ErrorDialog, MachineView, VariableView};
use sbm_common::ResourceKind;
use std::io::{self, Stderr, Stdout, Write};

/// Prints console output as plain text.
///
/// Record bodies go to `out` verbatim so they can be redirected to a file;
/// error dialogs go to `err`. In form mode records are printed as the JSON
/// object an edit form would submit.
///
/// `Presenter` callbacks cannot fail, so the first write error on `out` is
/// kept and handed back by [`TerminalPresenter::finish`].
pub struct TerminalPresenter<O = Stdout, E = Stderr> {
    out: O,
    err: E,
    form: bool,
    write_error: Option<io::Error>,
}

impl TerminalPresenter {
    pub fn stdio() -> Self {
        Self::new(io::stdout(), io::stderr())
    }
}

impl<O: Write, E: Write> TerminalPresenter<O, E> {
    pub fn new(out: O, err: E) -> Self {
        Self {
            out,
            err,
            form: false,
            write_error: None,
        }
    }

    pub fn set_form_output(&mut self, form: bool) {
        self.form = form;
    }

    #[cfg(test)]
    pub fn into_inner(self) -> (O, E) {
        (self.out, self.err)
    }

    /// Writes a block of text, adding a final newline when it lacks one.
    pub fn print_block(&mut self, text: &str) -> io::Result<()> {
        self.out.write_all(text.as_bytes())?;
        if !text.ends_with('\n') {
            self.out.write_all(b"\n")?;
        }
        Ok(())
    }

    pub fn print_line(&mut self, line: &str) -> io::Result<()> {
        writeln!(self.out, "{}", line)
    }

    /// Flushes `out` and returns the first write error seen by a callback.
    pub fn finish(&mut self) -> io::Result<()> {
        if let Some(e) = self.write_error.take() {
            return Err(e);
        }
        self.out.flush()
    }

    fn keep_error(&mut self, result: io::Result<()>) {
        if let Err(e) = result {
            self.write_error.get_or_insert(e);
        }
    }

    fn render_machine_fields(&mut self, view: &MachineView) -> io::Result<()> {
        writeln!(self.out, "hostname:       {}", view.hostname)?;
        writeln!(self.out, "default_boot:   {}", view.default_boot)?;
        writeln!(self.out, "alternate_boot: {}", view.alternate_boot)?;
        writeln!(self.out, "switch_type:    {}", view.switch_type)?;
        if view.time_between_visible {
            writeln!(self.out, "time_between:   {}", view.time_between)?;
        }
        if let Some(last_boot) = &view.last_boot {
            writeln!(self.out, "last_boot:      {}", last_boot)?;
        }
        Ok(())
    }
}

impl<O: Write, E: Write> Presenter for TerminalPresenter<O, E> {
    fn render_list(&mut self, _kind: ResourceKind, items: &[String]) {
        for item in items {
            let written = writeln!(self.out, "{}", item);
            self.keep_error(written);
        }
    }

    fn render_boot_config(&mut self, view: BootConfigView) {
        let written = if self.form {
            self.print_line(&serialize_form(view.form_fields()))
        } else {
            self.print_block(&view.config)
        };
        self.keep_error(written);
    }

    fn render_machine(&mut self, view: MachineView) {
        let written = if self.form {
            self.print_line(&serialize_form(view.form_fields()))
        } else {
            self.render_machine_fields(&view)
        };
        self.keep_error(written);
    }

    fn render_variable(&mut self, view: VariableView) {
        let written = if self.form {
            self.print_line(&serialize_form(view.form_fields()))
        } else {
            self.print_block(&view.value)
        };
        self.keep_error(written);
    }

    // Nowhere left to report a failed write to stderr.
    fn show_error(&mut self, dialog: ErrorDialog) {
        let _ = writeln!(self.err, "🔴 {}", dialog.title);
        let _ = writeln!(self.err, "{}", dialog.message.trim_end());
    }
}
