/// Line-oriented command shell over an `EditSession`.
///
/// One command per line. Blank lines and `#` comments are skipped. A
/// failing command prints an error with its line number and the shell
/// carries on with the next line.
use std::io::{self, BufRead, Write};

use anyhow::{bail, Result};

use editor3d_config::EditorConfig;
use editor3d_core::{EditSession, ObjectId, Property, Scene, SceneObject, Shape};

/// A parsed shell command.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Create { shape: Shape, name: Option<String> },
    Set {
        object: String,
        property: Property,
        value: String,
    },
    Undo,
    Redo,
    Delete { object: String },
    List,
    Show { object: String },
    Dump,
    History,
    Quit,
}

/// Parses one input line. Returns `None` for blank lines and comments.
pub fn parse_line(line: &str) -> Result<Option<Command>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };
    let args: Vec<&str> = words.collect();

    let command = match verb.to_ascii_lowercase().as_str() {
        "box" => Command::Create {
            shape: Shape::cuboid(),
            name: optional_name("box", &args)?,
        },
        "sphere" => Command::Create {
            shape: Shape::sphere(),
            name: optional_name("sphere", &args)?,
        },
        "mesh" => match args.as_slice() {
            [path] => Command::Create {
                shape: Shape::mesh(*path),
                name: None,
            },
            [path, name] => Command::Create {
                shape: Shape::mesh(*path),
                name: Some(name.to_string()),
            },
            _ => bail!("usage: mesh PATH [NAME]"),
        },
        "set" => match args.as_slice() {
            [object, property, value @ ..] if !value.is_empty() => Command::Set {
                object: object.to_string(),
                property: property.parse()?,
                value: value.join(" "),
            },
            _ => bail!("usage: set OBJECT PROPERTY VALUE"),
        },
        "delete" => Command::Delete {
            object: single_object("delete", &args)?,
        },
        "show" => Command::Show {
            object: single_object("show", &args)?,
        },
        "undo" => no_args("undo", Command::Undo, &args)?,
        "redo" => no_args("redo", Command::Redo, &args)?,
        "list" => no_args("list", Command::List, &args)?,
        "dump" => no_args("dump", Command::Dump, &args)?,
        "history" => no_args("history", Command::History, &args)?,
        "quit" | "exit" => no_args("quit", Command::Quit, &args)?,
        other => bail!("unknown command '{other}'"),
    };
    Ok(Some(command))
}

fn optional_name(verb: &str, args: &[&str]) -> Result<Option<String>> {
    match args {
        [] => Ok(None),
        [name] => Ok(Some(name.to_string())),
        _ => bail!("usage: {verb} [NAME]"),
    }
}

fn single_object(verb: &str, args: &[&str]) -> Result<String> {
    match args {
        [object] => Ok(object.to_string()),
        _ => bail!("usage: {verb} OBJECT"),
    }
}

fn no_args(verb: &str, command: Command, args: &[&str]) -> Result<Command> {
    if !args.is_empty() {
        bail!("'{verb}' takes no arguments");
    }
    Ok(command)
}

/// Whether the shell should keep reading input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

pub struct Shell<W: Write> {
    session: EditSession,
    out: W,
    echo: bool,
}

impl<W: Write> Shell<W> {
    pub fn new(config: &EditorConfig, out: W) -> Self {
        Self {
            session: EditSession::new(config),
            out,
            echo: config.echo_commands,
        }
    }

    #[cfg(test)]
    pub fn session(&self) -> &EditSession {
        &self.session
    }

    /// Executes every line of `input` until it ends or `quit` is read.
    ///
    /// Command errors and lines that are not UTF-8 are printed; only other
    /// I/O failures abort the run.
    pub fn run<R: BufRead>(&mut self, input: R) -> Result<()> {
        for (index, line) in input.lines().enumerate() {
            let line_no = index + 1;
            let outcome = match line {
                Ok(line) => self.execute_line(&line),
                Err(e) if e.kind() == io::ErrorKind::InvalidData => {
                    Err(anyhow::Error::new(e).context("line is not valid UTF-8"))
                }
                Err(e) => return Err(e.into()),
            };
            match outcome {
                Ok(Flow::Continue) => {}
                Ok(Flow::Quit) => break,
                Err(e) => {
                    tracing::debug!(line = line_no, error = %e, "Command failed");
                    writeln!(self.out, "error (line {line_no}): {e}")?;
                }
            }
        }
        self.out.flush()?;
        tracing::info!(
            objects = self.session.scene().len(),
            history = self.session.history().len(),
            "Session finished"
        );
        Ok(())
    }

    pub fn execute_line(&mut self, line: &str) -> Result<Flow> {
        let Some(command) = parse_line(line)? else {
            return Ok(Flow::Continue);
        };
        if self.echo {
            writeln!(self.out, "> {}", line.trim())?;
        }
        self.execute(command)
    }

    pub fn execute(&mut self, command: Command) -> Result<Flow> {
        match command {
            Command::Create { shape, name } => {
                let kind = shape.kind();
                let id = self.session.create(shape, name.as_deref());
                let name = self.name_of(id);
                writeln!(self.out, "Created {kind} '{name}' ({})", id.short())?;
            }
            Command::Set {
                object,
                property,
                value,
            } => {
                let id = self.session.resolve(&object)?;
                self.session.set_property(id, property, &value)?;
                let scene = self.session.scene();
                if let Some(obj) = scene.get(id) {
                    let shown = format_property(scene, obj, property).unwrap_or_default();
                    writeln!(self.out, "{}.{property} = {shown}", obj.name)?;
                }
            }
            Command::Undo => {
                let label = self.session.history().undo_label().map(str::to_string);
                match (self.session.undo(), label) {
                    (Some(id), Some(label)) => {
                        let name = self.name_of(id);
                        writeln!(self.out, "Undid {label} on '{name}'")?;
                        self.refresh();
                    }
                    _ => writeln!(self.out, "Nothing to undo")?,
                }
            }
            Command::Redo => {
                let label = self.session.history().redo_label().map(str::to_string);
                match (self.session.redo(), label) {
                    (Some(id), Some(label)) => {
                        let name = self.name_of(id);
                        writeln!(self.out, "Redid {label} on '{name}'")?;
                        self.refresh();
                    }
                    _ => writeln!(self.out, "Nothing to redo")?,
                }
            }
            Command::Delete { object } => {
                let id = self.session.resolve(&object)?;
                let name = self.name_of(id);
                let removed = self.session.delete(id)?;
                match removed.len() {
                    1 => writeln!(self.out, "Deleted '{name}'")?,
                    n => writeln!(self.out, "Deleted '{name}' and {} children", n - 1)?,
                }
            }
            Command::List => self.list()?,
            Command::Show { object } => {
                let id = self.session.resolve(&object)?;
                self.show(id)?;
            }
            Command::Dump => {
                let objects: Vec<&SceneObject> = self.session.scene().iter().collect();
                let json = serde_json::to_string_pretty(&objects)?;
                writeln!(self.out, "{json}")?;
            }
            Command::History => self.history()?,
            Command::Quit => return Ok(Flow::Quit),
        }
        Ok(Flow::Continue)
    }

    /// Re-reads objects touched by undo/redo. Headless, so only logged.
    fn refresh(&mut self) {
        for id in self.session.take_refresh() {
            if let Some(obj) = self.session.scene().get(id) {
                tracing::debug!(object = %id.short(), name = %obj.name, "Refreshed object");
            }
        }
    }

    fn name_of(&self, id: ObjectId) -> String {
        self.session
            .scene()
            .get(id)
            .map(|o| o.name.clone())
            .unwrap_or_else(|| id.short())
    }

    fn list(&mut self) -> Result<()> {
        let scene = self.session.scene();
        if scene.is_empty() {
            writeln!(self.out, "Scene is empty")?;
            return Ok(());
        }
        let mut lines = Vec::new();
        for root in scene.roots() {
            tree_lines(scene, root, 0, &mut lines);
        }
        for line in lines {
            writeln!(self.out, "{line}")?;
        }
        Ok(())
    }

    fn show(&mut self, id: ObjectId) -> Result<()> {
        let scene = self.session.scene();
        let Some(obj) = scene.get(id) else {
            return Ok(());
        };
        writeln!(self.out, "{} ({}, {})", obj.name, obj.shape.kind(), id.short())?;
        for property in Property::ALL {
            if let Some(value) = format_property(scene, obj, property) {
                writeln!(self.out, "  {property}: {value}")?;
            }
        }
        if let Some(path) = scene.mesh_path(id) {
            writeln!(self.out, "  path: {}", path.display())?;
        }
        Ok(())
    }

    fn history(&mut self) -> Result<()> {
        let history = self.session.history();
        if history.is_empty() {
            writeln!(self.out, "History is empty")?;
            return Ok(());
        }
        let cursor = history.cursor();
        let scene = self.session.scene();
        for entry in history.entries() {
            let marker = if Some(entry.index) == cursor {
                '>'
            } else if entry.applied {
                '*'
            } else {
                ' '
            };
            let target = scene
                .get(entry.target)
                .map(|o| o.name.clone())
                .unwrap_or_else(|| entry.target.short());
            writeln!(
                self.out,
                "{marker} {:>3}  {:<12} {target}",
                entry.index, entry.label
            )?;
        }
        Ok(())
    }
}

fn tree_lines(scene: &Scene, id: ObjectId, depth: usize, lines: &mut Vec<String>) {
    let Some(obj) = scene.get(id) else {
        return;
    };
    lines.push(format!(
        "{}{} ({})",
        "  ".repeat(depth),
        obj.name,
        obj.shape.kind()
    ));
    for child in scene.children_of(id) {
        tree_lines(scene, child, depth + 1, lines);
    }
}

/// Text form of a property, or `None` if the object's shape lacks it.
fn format_property(scene: &Scene, obj: &SceneObject, property: Property) -> Option<String> {
    let value = match (property, &obj.shape) {
        (Property::Name, _) => obj.name.clone(),
        (Property::Color, _) => obj.color.to_hex(),
        (Property::Position, _) => {
            format!("{} {} {}", obj.position.x, obj.position.y, obj.position.z)
        }
        (Property::Rotation, _) => {
            format!("{} {} {}", obj.rotation.x, obj.rotation.y, obj.rotation.z)
        }
        (Property::Parent, _) => match obj.parent {
            Some(parent) => scene
                .get(parent)
                .map(|p| p.name.clone())
                .unwrap_or_else(|| parent.short()),
            None => "none".to_string(),
        },
        (Property::Radius, Shape::Sphere { radius }) => radius.to_string(),
        (Property::Width, Shape::Box { width, .. }) => width.to_string(),
        (Property::Height, Shape::Box { height, .. }) => height.to_string(),
        (Property::Length, Shape::Box { length, .. }) => length.to_string(),
        (Property::Scale, Shape::Mesh { scale, .. }) => scale.to_string(),
        _ => return None,
    };
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use editor3d_config::Color;

    fn run_script(config: &EditorConfig, script: &str) -> (String, Shell<Vec<u8>>) {
        let mut shell = Shell::new(config, Vec::new());
        shell.run(script.as_bytes()).unwrap();
        let out = String::from_utf8(shell.out.clone()).unwrap();
        (out, shell)
    }

    fn output_of(script: &str) -> String {
        run_script(&EditorConfig::default(), script).0
    }

    // ── Parsing ────────────────────────────────────────────────────────

    #[test]
    fn test_parse_skips_blank_and_comments() {
        assert_eq!(parse_line("").unwrap(), None);
        assert_eq!(parse_line("   ").unwrap(), None);
        assert_eq!(parse_line("# a comment").unwrap(), None);
    }

    #[test]
    fn test_parse_create_commands() {
        assert_eq!(
            parse_line("box Crate").unwrap(),
            Some(Command::Create {
                shape: Shape::cuboid(),
                name: Some("Crate".to_string())
            })
        );
        assert_eq!(
            parse_line("SPHERE").unwrap(),
            Some(Command::Create {
                shape: Shape::sphere(),
                name: None
            })
        );
        assert_eq!(
            parse_line("mesh parts/gear.stl Gear").unwrap(),
            Some(Command::Create {
                shape: Shape::mesh("parts/gear.stl"),
                name: Some("Gear".to_string())
            })
        );
        assert!(parse_line("mesh").is_err());
        assert!(parse_line("box a b").is_err());
    }

    #[test]
    fn test_parse_set_joins_value_words() {
        assert_eq!(
            parse_line("set Crate pos 1 2 3").unwrap(),
            Some(Command::Set {
                object: "Crate".to_string(),
                property: Property::Position,
                value: "1 2 3".to_string()
            })
        );
        assert!(parse_line("set Crate position").is_err());
        assert!(parse_line("set Crate mass 3").is_err());
    }

    #[test]
    fn test_parse_rejects_unknown_and_extra_args() {
        let err = parse_line("explode Crate").unwrap_err();
        assert_eq!(err.to_string(), "unknown command 'explode'");
        assert!(parse_line("undo 3").is_err());
        assert!(parse_line("delete").is_err());
        assert_eq!(parse_line("exit").unwrap(), Some(Command::Quit));
    }

    // ── Execution ──────────────────────────────────────────────────────

    #[test]
    fn test_two_target_undo_sequence() {
        let script = "\
sphere T1
sphere T2
set T1 radius 15
set T2 radius 50
set T1 radius 20
set T2 radius 10
undo
undo
undo
undo
";
        let (out, shell) = run_script(&EditorConfig::default(), script);
        assert!(out.contains("Undid Set radius on 'T2'"));
        let scene = shell.session().scene();
        for obj in scene.iter() {
            assert_eq!(obj.shape, Shape::Sphere { radius: 1.0 });
        }
        assert!(!shell.session().history().can_undo());
    }

    #[test]
    fn test_set_prints_new_value() {
        let out = output_of("box Crate\nset Crate width 2.5\nset Crate color #00FF00\n");
        assert!(out.contains("Crate.width = 2.5"));
        assert!(out.contains("Crate.color = #00ff00"));
    }

    #[test]
    fn test_errors_report_line_and_continue() {
        let out = output_of("box Crate\n\nset Crate radius 2\nset Ghost width 1\nlist\n");
        assert!(out.contains("error (line 3): A box has no radius property"), "{out}");
        assert!(out.contains("error (line 4):"));
        assert!(out.contains("Crate (box)"));
    }

    #[test]
    fn test_nothing_to_undo_or_redo() {
        let out = output_of("undo\nredo\n");
        assert_eq!(out, "Nothing to undo\nNothing to redo\n");
    }

    #[test]
    fn test_list_prints_tree() {
        let out = output_of(
            "box Table\nsphere Cup\nsphere Lamp\nset Cup parent Table\nlist\n",
        );
        let tree: Vec<&str> = out.lines().skip(4).collect();
        assert_eq!(tree, vec!["Table (box)", "  Cup (sphere)", "Lamp (sphere)"]);
    }

    #[test]
    fn test_delete_subtree_and_history() {
        let script = "\
box Table
sphere Cup
set Cup parent Table
set Cup radius 0.5
sphere Lamp
set Lamp radius 2
delete Table
history
";
        let (out, shell) = run_script(&EditorConfig::default(), script);
        assert!(out.contains("Deleted 'Table' and 1 children"));
        assert_eq!(shell.session().scene().len(), 1);
        let last = out.lines().last().unwrap();
        assert_eq!(last, ">   0  Set radius   Lamp");
    }

    #[test]
    fn test_history_marks_applied_and_cursor() {
        let out = output_of("box A\nset A width 2\nset A width 3\nset A width 4\nundo\nhistory\n");
        let history: Vec<&str> = out.lines().rev().take(3).collect();
        assert_eq!(
            history,
            vec![
                "    2  Set width    A",
                ">   1  Set width    A",
                "*   0  Set width    A",
            ]
        );
    }

    #[test]
    fn test_show_lists_shape_properties() {
        let out = output_of("mesh gear.stl Gear\nset Gear scale 2\nshow Gear\n");
        assert!(out.contains("  scale: 2"));
        assert!(out.contains("  path: gear.stl"));
        assert!(out.contains("  parent: none"));
        assert!(!out.contains("radius"));
    }

    #[test]
    fn test_dump_is_json() {
        let out = output_of("sphere Ball\ndump\n");
        let json_start = out.find('[').unwrap();
        let value: serde_json::Value = serde_json::from_str(&out[json_start..]).unwrap();
        assert_eq!(value[0]["name"], "Ball");
        assert_eq!(value[0]["shape"]["kind"], "sphere");
    }

    #[test]
    fn test_quit_stops_reading() {
        let (_, shell) = run_script(&EditorConfig::default(), "box A\nquit\nbox B\n");
        assert_eq!(shell.session().scene().len(), 1);
    }

    #[test]
    fn test_echo_and_config_color() {
        let config = EditorConfig {
            echo_commands: true,
            default_color: Color::rgb(1, 2, 3),
            ..Default::default()
        };
        let (out, shell) = run_script(&config, "box Crate\n# skipped\n");
        assert!(out.starts_with("> box Crate\nCreated box 'Crate'"));
        assert!(!out.contains("skipped"));
        let obj = shell.session().scene().iter().next().unwrap();
        assert_eq!(obj.color, Color::rgb(1, 2, 3));
    }

    #[test]
    fn test_invalid_utf8_line_is_reported_and_skipped() {
        let mut shell = Shell::new(&EditorConfig::default(), Vec::new());
        let input: &[u8] = b"box A\n\xff\xfe oops\nbox B\n";
        shell.run(input).unwrap();

        let out = String::from_utf8(shell.out.clone()).unwrap();
        assert!(out.contains("error (line 2): line is not valid UTF-8"), "{out}");
        assert_eq!(shell.session().scene().len(), 2);
    }

    #[test]
    fn test_rename_rejects_whitespace() {
        let (out, shell) = run_script(
            &EditorConfig::default(),
            "box A\nset A name Big Crate\nset A name Crate\nshow Crate\n",
        );
        assert!(out.contains("error (line 2): Invalid name"), "{out}");
        assert!(out.contains("Crate (box,"));
        assert_eq!(shell.session().history().len(), 1);
    }
}
