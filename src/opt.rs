use structopt::StructOpt;
use thiserror::Error;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum TeamParseError {
    #[error("team name is empty")]
    Empty,
    #[error("invalid character `{0}` in team name")]
    InvalidChar(char),
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum CookieParseError {
    #[error("cookie is empty")]
    Empty,
}

/// The team is used as a subdomain, so only a single DNS label is accepted.
fn valid_team<S>(src: S) -> Result<String, TeamParseError>
where
    S: AsRef<str>,
{
    let team = src.as_ref().trim();
    if team.is_empty() {
        return Err(TeamParseError::Empty);
    }
    match team.chars().find(|c| !c.is_ascii_alphanumeric() && *c != '-') {
        Some(c) => Err(TeamParseError::InvalidChar(c)),
        None => Ok(team.to_owned()),
    }
}

fn valid_cookie<S>(src: S) -> Result<String, CookieParseError>
where
    S: AsRef<str>,
{
    let cookie = src.as_ref().trim();
    if cookie.is_empty() {
        Err(CookieParseError::Empty)
    } else {
        Ok(cookie.to_owned())
    }
}

#[derive(Debug, StructOpt)]
#[structopt(
    name = "slackmojify",
    about = "Copy emojis from slackmojis.com into a Slack workspace."
)]
pub struct Opt {
    /// Slack team, as in `<team>.slack.com`
    #[structopt(parse(try_from_str = valid_team))]
    pub team: String,

    /// Value of the `Cookie` header of a logged-in browser session
    #[structopt(parse(try_from_str = valid_cookie))]
    pub cookie: String,
}
