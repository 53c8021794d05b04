use crate::{config::ParserConfig, error::Error};

/// The role a code point plays under the active dialect.
///
/// Every ASCII code point holds exactly one class; everything at or above
/// U+0080 is always [`Normal`].
///
/// [`Normal`]: CharacterClass::Normal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum CharacterClass {
    /// Plain field content.
    Normal,
    /// Takes the following character literally.
    Escape,
    /// Opens or closes a quoted field.
    Quote,
    /// Ends the current field.
    FieldSeparator,
    /// Part of the record separator sequence.
    RecordSeparator,
    /// Dropped from the stream entirely.
    ToIgnore,
    /// Trimmed at field boundaries, content in between.
    ToIgnoreAroundFields,
}

/// Dense classification table for the 128 ASCII code points.
///
/// Built once per validated [`ParserConfig`] and immutable afterwards, so a
/// single table can serve any number of independently-owned tokenizers.
#[derive(Debug, Clone)]
pub(crate) struct ClassTable {
    classes: [CharacterClass; 128],
}

impl ClassTable {
    /// Translates a dialect description into a lookup table.
    ///
    /// Every entry starts as `Normal` and is overwritten in priority order:
    /// ignore-around-fields, ignore, record separator, quote, escape, field
    /// separator. Later assignments win on collision; a collision that erases
    /// a mandatory class fails validation.
    pub(crate) fn build(config: &ParserConfig) -> Result<Self, Error> {
        if config.record_separator.is_empty() {
            return Err(Error::Configuration(
                "record separator must contain at least one character".into(),
            ));
        }

        let mut classes = [CharacterClass::Normal; 128];
        for &ch in &config.ignore_around_fields {
            assign(&mut classes, ch, CharacterClass::ToIgnoreAroundFields)?;
        }
        for &ch in &config.ignore {
            assign(&mut classes, ch, CharacterClass::ToIgnore)?;
        }
        for ch in config.record_separator.chars() {
            assign(&mut classes, ch, CharacterClass::RecordSeparator)?;
        }
        assign(&mut classes, config.quote, CharacterClass::Quote)?;
        if let Some(escape) = config.escape {
            assign(&mut classes, escape, CharacterClass::Escape)?;
        }
        assign(&mut classes, config.field_separator, CharacterClass::FieldSeparator)?;

        for (class, name) in [
            (CharacterClass::Quote, "quote"),
            (CharacterClass::FieldSeparator, "field separator"),
            (CharacterClass::RecordSeparator, "record separator"),
        ] {
            if !classes.contains(&class) {
                return Err(Error::Configuration(format!(
                    "no character is classified as the {name}"
                )));
            }
        }

        Ok(Self { classes })
    }

    /// Classifies one character. O(1), allocation-free.
    #[inline]
    pub(crate) fn classify(&self, ch: char) -> CharacterClass {
        match u32::from(ch) {
            code if code < 128 => self.classes[code as usize],
            _ => CharacterClass::Normal,
        }
    }
}

fn assign(
    classes: &mut [CharacterClass; 128],
    ch: char,
    class: CharacterClass,
) -> Result<(), Error> {
    let code = ch as usize;
    if code >= 128 {
        return Err(Error::Configuration(format!(
            "character {ch:?} is outside the ASCII range"
        )));
    }
    classes[code] = class;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{CharacterClass, ClassTable};
    use crate::ParserConfig;

    #[test]
    fn default_dialect_classification() {
        let table = ClassTable::build(&ParserConfig::default()).unwrap();
        assert_eq!(table.classify(','), CharacterClass::FieldSeparator);
        assert_eq!(table.classify('"'), CharacterClass::Quote);
        assert_eq!(table.classify('\n'), CharacterClass::RecordSeparator);
        assert_eq!(table.classify(' '), CharacterClass::ToIgnoreAroundFields);
        assert_eq!(table.classify('\t'), CharacterClass::ToIgnoreAroundFields);
        assert_eq!(table.classify('x'), CharacterClass::Normal);
    }

    #[test]
    fn non_ascii_is_always_normal() {
        let table = ClassTable::build(&ParserConfig::default()).unwrap();
        assert_eq!(table.classify('é'), CharacterClass::Normal);
        assert_eq!(table.classify('\u{FFFD}'), CharacterClass::Normal);
    }

    #[test]
    fn later_assignment_wins_on_collision() {
        // Field separator is written last, so it beats the trim set.
        let config = ParserConfig {
            field_separator: ' ',
            ..ParserConfig::default()
        };
        let table = ClassTable::build(&config).unwrap();
        assert_eq!(table.classify(' '), CharacterClass::FieldSeparator);
        assert_eq!(table.classify('\t'), CharacterClass::ToIgnoreAroundFields);
    }

    #[test]
    fn colliding_mandatory_classes_fail_validation() {
        let config = ParserConfig {
            quote: ',',
            ..ParserConfig::default()
        };
        let err = ClassTable::build(&config).unwrap_err();
        assert!(err.to_string().contains("quote"));
    }

    #[test]
    fn non_ascii_configuration_is_rejected() {
        let config = ParserConfig {
            quote: '«',
            ..ParserConfig::default()
        };
        assert!(ClassTable::build(&config).is_err());
    }

    #[test]
    fn empty_record_separator_is_rejected() {
        let config = ParserConfig {
            record_separator: String::new(),
            ..ParserConfig::default()
        };
        assert!(ClassTable::build(&config).is_err());
    }
}
