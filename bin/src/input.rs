//! Readers for the two framework file formats.
use af_vis::{
    af::{Af, AttackSpec},
    datatypes::Argument,
    Error, Result,
};
use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_while1},
    character::complete::{multispace0, multispace1},
    combinator::{all_consuming, map, value},
    multi::many0,
    sequence::{delimited, preceded, separated_pair, terminated, tuple},
    IResult,
};
use serde::Deserialize;
use strum::{EnumString, EnumVariantNames};

/// Supported framework file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumString, EnumVariantNames, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum Format {
    /// `arg(a). att(a,b).`
    Apx,
    /// `{"name": .., "arguments": [..], "defeats": [..]}`
    Json,
}

impl Format {
    /// Guesses the format by the file extension; everything but `.json` is read as APX.
    pub fn guess(path: &std::path::Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Format::Json,
            _ => Format::Apx,
        }
    }

    /// Reads a framework.
    pub fn read(self, name: &str, input: &str) -> Result<Af> {
        log::info!("[Start] reading {self} input");
        let af = match self {
            Format::Apx => read_apx(name, input),
            Format::Json => read_json(name, input),
        }?;
        log::info!("[Done] reading");
        Ok(af)
    }
}

#[derive(Debug, Deserialize)]
struct JsonFramework {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    arguments: Vec<Argument>,
    #[serde(default, alias = "attacks")]
    defeats: Vec<JsonDefeat>,
}

#[derive(Debug, Deserialize)]
struct JsonDefeat {
    from: String,
    to: String,
    #[serde(default)]
    annotation: Option<String>,
}

impl From<JsonDefeat> for AttackSpec {
    fn from(defeat: JsonDefeat) -> Self {
        AttackSpec {
            from: defeat.from,
            to: defeat.to,
            annotation: defeat.annotation,
        }
    }
}

fn read_json(name: &str, input: &str) -> Result<Af> {
    let framework: JsonFramework = serde_json::from_str(input)
        .map_err(|err| Error::Unreadable(format!("framework: {err}")))?;
    Af::new(
        framework.name.unwrap_or_else(|| name.to_string()),
        framework.arguments,
        framework.defeats,
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Statement<'a> {
    Arg(&'a str),
    Att(&'a str, &'a str),
}

fn read_apx(name: &str, input: &str) -> Result<Af> {
    let (_, statements) = all_consuming(statements)(input)
        .map_err(|err| Error::Unreadable(format!("framework: {err}")))?;
    let mut arguments = Vec::new();
    let mut attacks = Vec::new();
    for statement in statements {
        match statement {
            Statement::Arg(id) => arguments.push(id),
            Statement::Att(from, to) => attacks.push((from, to)),
        }
    }
    Af::new(name, arguments, attacks)
}

fn statements(input: &str) -> IResult<&str, Vec<Statement<'_>>> {
    preceded(skip, many0(terminated(alt((argument, attack)), skip)))(input)
}

/// Whitespace and `%` comments.
fn skip(input: &str) -> IResult<&str, ()> {
    value(
        (),
        many0(alt((
            value((), multispace1),
            value((), preceded(tag("%"), opt_line)),
        ))),
    )(input)
}

fn opt_line(input: &str) -> IResult<&str, &str> {
    alt((is_not("\n"), tag("")))(input)
}

fn argument(input: &str) -> IResult<&str, Statement<'_>> {
    map(
        delimited(
            tuple((tag("arg"), multispace0, tag("("), multispace0)),
            atomic,
            tuple((multispace0, tag(")"), multispace0, tag("."))),
        ),
        Statement::Arg,
    )(input)
}

fn attack(input: &str) -> IResult<&str, Statement<'_>> {
    map(
        delimited(
            tuple((tag("att"), multispace0, tag("("), multispace0)),
            separated_pair(atomic, delimited(multispace0, tag(","), multispace0), atomic),
            tuple((multispace0, tag(")"), multispace0, tag("."))),
        ),
        |(from, to)| Statement::Att(from, to),
    )(input)
}

fn atomic(input: &str) -> IResult<&str, &str> {
    alt((
        delimited(tag("\""), is_not("\""), tag("\"")),
        take_while1(|c: char| c.is_alphanumeric() || c == '_' || c == '-'),
    ))(input)
}
