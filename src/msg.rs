use serde::{Deserialize, Serialize};

#[derive(Clone, Debug)]
/// A message which is sent following a change to the results of a
/// tournament. Standings pages listen for these and reload.
pub struct Msg {
    pub tournament_id: String,
    pub inner: MsgContents,
}

#[derive(Clone, Serialize, Deserialize, Debug, PartialEq, Eq)]
pub enum MsgContents {
    ResultRecorded { match_id: String },
    ResultCleared { match_id: String },
    MatchUpdated { match_id: String },
}
