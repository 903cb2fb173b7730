use std::collections::HashMap;
use std::fmt::Display;

use super::values::{Type, Value};


// Immutable environment. Binding a variable never touches the receiver, it
// hands back a new state, so every state given out stays a valid snapshot.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct State {
    vars: HashMap<String, (Value, Type)>,
}

impl State {
    pub fn new() -> Self {
        Self {
            vars: HashMap::new(),
        }
    }

    // Most recent binding, None if the variable was never assigned
    pub fn lookup(&self, name: &str) -> Option<&(Value, Type)> {
        self.vars.get(name)
    }

    // Full copy of the receiver with one binding added or overwritten
    pub fn bind(&self, name: impl Into<String>, value: Value, var_type: Type) -> State {
        let mut vars = self.vars.clone();
        vars.insert(name.into(), (value, var_type));

        State { vars }
    }

    pub fn contains(&self, name: &str) -> bool {
        self.vars.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.vars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
    }

    // Bindings sorted by name
    pub fn iter(&self) -> impl Iterator<Item = (&String, &(Value, Type))> {
        let mut bindings: Vec<_> = self.vars.iter().collect();
        bindings.sort_by(|a, b| a.0.cmp(b.0));

        bindings.into_iter()
    }
}

impl Display for State {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.is_empty() {
            return write!(f, "{{}}");
        }

        for (idx, (name, (value, var_type))) in self.iter().enumerate() {
            // One binding per line, no trailing line return
            if idx != 0 {
                writeln!(f)?;
            }
            write!(f, "{}: ({:?}, {})", name, value, var_type)?;
        }

        Ok(())
    }
}
