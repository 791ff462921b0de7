//! INI document model for procServ config and site-profile files.
//!
//! Supports the configparser subset those files use: `[section]` headers, a
//! `[DEFAULT]` section whose keys apply to every other section of the same
//! file, `key = value` or `key: value` options, full-line `#` / `;` comments
//! and indented continuation lines. Option names are case-insensitive.
//!
//! Pure functions only: no I/O.

/// Name of the section that supplies fallback values.
pub const DEFAULT_SECTION: &str = "DEFAULT";

/// A syntax error, with the 1-based line it was found on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSyntaxError {
    pub line: usize,
    pub message: String,
}

/// One named section and its options, in file order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IniSection {
    pub name: String,
    pub entries: Vec<(String, String)>,
}

impl IniSection {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entries: Vec::new(),
        }
    }

    /// Value of `key` in this section only.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        let key = key.to_ascii_lowercase();
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Set `key`, replacing an existing value in place.
    pub fn set(&mut self, key: &str, value: impl Into<String>) {
        let key = key.to_ascii_lowercase();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }
}

/// A parsed INI file.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IniDocument {
    /// Options of the `[DEFAULT]` section.
    pub defaults: Vec<(String, String)>,
    pub sections: Vec<IniSection>,
}

#[derive(Clone, Copy)]
enum Target {
    Nothing,
    Defaults,
    Section(usize),
}

impl IniDocument {
    /// Parse INI text.
    ///
    /// # Errors
    ///
    /// Returns an [`IniSyntaxError`] for malformed headers, options outside a
    /// section, lines without a `=`/`:` separator, and duplicate sections or
    /// options.
    pub fn parse(text: &str) -> Result<Self, IniSyntaxError> {
        let mut doc = Self::default();
        let mut target = Target::Nothing;
        // Index of the last option written, for continuation lines.
        let mut last_entry: Option<usize> = None;

        for (idx, raw) in text.lines().enumerate() {
            let line = idx + 1;
            let trimmed = raw.trim();
            if trimmed.is_empty() {
                last_entry = None;
                continue;
            }
            if trimmed.starts_with('#') || trimmed.starts_with(';') {
                continue;
            }

            let indented = raw.starts_with(char::is_whitespace);
            if indented && let Some(entry) = last_entry {
                let entries = doc.entries_mut(target);
                let value = &mut entries[entry].1;
                if !value.is_empty() {
                    value.push(' ');
                }
                value.push_str(trimmed);
                continue;
            }

            if let Some(rest) = trimmed.strip_prefix('[') {
                let Some(name) = rest.strip_suffix(']') else {
                    return Err(syntax(line, "unterminated section header"));
                };
                let name = name.trim();
                if name.is_empty() {
                    return Err(syntax(line, "empty section name"));
                }
                if name == DEFAULT_SECTION {
                    target = Target::Defaults;
                } else {
                    if doc.section(name).is_some() {
                        return Err(syntax(line, &format!("duplicate section [{name}]")));
                    }
                    doc.sections.push(IniSection::new(name));
                    target = Target::Section(doc.sections.len() - 1);
                }
                last_entry = None;
                continue;
            }

            let Some(split) = trimmed.find(['=', ':']) else {
                return Err(syntax(line, "expected 'key = value'"));
            };
            let key = trimmed[..split].trim().to_ascii_lowercase();
            let value = trimmed[split + 1..].trim().to_string();
            if key.is_empty() {
                return Err(syntax(line, "empty option name"));
            }
            if matches!(target, Target::Nothing) {
                return Err(syntax(line, "option outside of any section"));
            }
            let entries = doc.entries_mut(target);
            if entries.iter().any(|(k, _)| *k == key) {
                return Err(syntax(line, &format!("duplicate option '{key}'")));
            }
            entries.push((key, value));
            last_entry = Some(entries.len() - 1);
        }

        Ok(doc)
    }

    fn entries_mut(&mut self, target: Target) -> &mut Vec<(String, String)> {
        match target {
            Target::Section(idx) => &mut self.sections[idx].entries,
            Target::Defaults | Target::Nothing => &mut self.defaults,
        }
    }

    #[must_use]
    pub fn section(&self, name: &str) -> Option<&IniSection> {
        self.sections.iter().find(|s| s.name == name)
    }

    /// Look `key` up in `section`, falling back to `[DEFAULT]`.
    #[must_use]
    pub fn lookup<'a>(&'a self, section: &'a IniSection, key: &str) -> Option<&'a str> {
        section.get(key).or_else(|| {
            let key = key.to_ascii_lowercase();
            self.defaults
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        })
    }

    /// `section` with the `[DEFAULT]` options it does not override merged in.
    #[must_use]
    pub fn resolved(&self, section: &IniSection) -> IniSection {
        let mut out = section.clone();
        for (key, value) in &self.defaults {
            if out.get(key).is_none() {
                out.entries.push((key.clone(), value.clone()));
            }
        }
        out
    }

    /// Remove `name`; returns whether it was present.
    pub fn remove_section(&mut self, name: &str) -> bool {
        let before = self.sections.len();
        self.sections.retain(|s| s.name != name);
        self.sections.len() != before
    }

    /// Render back to text. Comments are not preserved.
    #[must_use]
    pub fn render(&self) -> String {
        let mut blocks: Vec<String> = Vec::new();
        if !self.defaults.is_empty() {
            blocks.push(render_block(DEFAULT_SECTION, &self.defaults));
        }
        for section in &self.sections {
            blocks.push(render_block(&section.name, &section.entries));
        }
        blocks.join("\n")
    }
}

fn render_block(name: &str, entries: &[(String, String)]) -> String {
    let mut out = format!("[{name}]\n");
    for (key, value) in entries {
        out.push_str(key);
        out.push_str(" = ");
        out.push_str(value);
        out.push('\n');
    }
    out
}

fn syntax(line: usize, message: &str) -> IniSyntaxError {
    IniSyntaxError {
        line,
        message: message.to_string(),
    }
}
