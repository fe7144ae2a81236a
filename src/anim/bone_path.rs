const BONE_PREFIX: &str = "pose.bones[";

/// What an animation curve's data path points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataPath<'a> {
    /// A property of the animated object itself, e.g. `location`.
    Object(&'a str),
    /// `pose.bones["<bone>"].<property>`
    Bone { bone: String, property: &'a str },
}

/// The path starts like a bone path but cannot be taken apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MalformedPath;

pub fn parse(path: &str) -> Result<DataPath<'_>, MalformedPath> {
    let Some(rest) = path.strip_prefix(BONE_PREFIX) else {
        return Ok(DataPath::Object(path));
    };

    let mut chars = rest.char_indices();
    let quote = match chars.next() {
        Some((_, q @ ('"' | '\''))) => q,
        _ => return Err(MalformedPath),
    };

    let mut bone = String::new();
    let mut close = None;
    while let Some((i, c)) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some((_, escaped)) => bone.push(escaped),
                None => return Err(MalformedPath),
            },
            c if c == quote => {
                close = Some(i);
                break;
            }
            c => bone.push(c),
        }
    }
    let close = close.ok_or(MalformedPath)?;

    let property = rest[close + 1..]
        .strip_prefix("].")
        .ok_or(MalformedPath)?;
    if bone.is_empty()
        || property.is_empty()
        || !property.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        return Err(MalformedPath);
    }
    Ok(DataPath::Bone { bone, property })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn object_paths_pass_through() {
        assert_eq!(parse("location"), Ok(DataPath::Object("location")));
    }

    #[test]
    fn bone_paths_split_name_and_property() {
        assert_eq!(
            parse(r#"pose.bones["Upper Arm.L"].rotation_quaternion"#),
            Ok(DataPath::Bone {
                bone: "Upper Arm.L".to_string(),
                property: "rotation_quaternion"
            })
        );
        assert_eq!(
            parse(r#"pose.bones['say \"hi\"'].rotation_euler"#),
            Ok(DataPath::Bone {
                bone: "say \"hi\"".to_string(),
                property: "rotation_euler"
            })
        );
    }

    #[test]
    fn broken_bone_paths_are_rejected() {
        for path in [
            r#"pose.bones["Arm"#,
            r#"pose.bones[Arm].location"#,
            r#"pose.bones["Arm"]location"#,
            r#"pose.bones[""].location"#,
            r#"pose.bones["Arm"]."#,
        ] {
            assert_eq!(parse(path), Err(MalformedPath), "{}", path);
        }
    }
}
