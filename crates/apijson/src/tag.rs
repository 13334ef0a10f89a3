//! Field annotation grammar.
//!
//! A tag is `key[,option]*`. Options are `computed`, `extras` and `inline`.
//! The unnamed key `-` must be paired with `extras` or `inline`.

/// Wire key used by bindings that have no key of their own.
pub const UNNAMED: &str = "-";

/// Date formatting hint attached to a binding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Format {
    #[default]
    None,
    Date,
    DateTime,
}

impl Format {
    pub fn name(self) -> &'static str {
        match self {
            Format::None => "time",
            Format::Date => "date",
            Format::DateTime => "date-time",
        }
    }
}

/// How a binding maps onto the enclosing JSON object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    /// Reads and writes the member at its wire key.
    Normal,
    /// Collects every member not claimed by another binding.
    Extras,
    /// Stands in for the whole enclosing value.
    Inline,
}

impl Role {
    pub fn name(self) -> &'static str {
        match self {
            Role::Normal => "normal",
            Role::Extras => "extras",
            Role::Inline => "inline",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tag {
    pub key: String,
    pub role: Role,
    pub computed: bool,
}

impl Tag {
    pub fn parse(text: &str) -> Result<Tag, &'static str> {
        let mut parts = text.split(',');
        let key = parts.next().unwrap_or_default();
        if key.is_empty() {
            return Err("empty wire key");
        }
        let mut role = Role::Normal;
        let mut computed = false;
        for option in parts {
            match option {
                "computed" if computed => return Err("repeated option"),
                "computed" => computed = true,
                "extras" | "inline" if role != Role::Normal => {
                    return Err("extras and inline are exclusive")
                }
                "extras" => role = Role::Extras,
                "inline" => role = Role::Inline,
                _ => return Err("unknown option"),
            }
        }
        match (key == UNNAMED, role) {
            (true, Role::Normal) => Err("`-` requires extras or inline"),
            (false, Role::Extras | Role::Inline) => Err("extras and inline require the `-` key"),
            _ => Ok(Tag {
                key: key.to_owned(),
                role,
                computed,
            }),
        }
    }
}
