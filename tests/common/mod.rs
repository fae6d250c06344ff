//! Shared fixture: the 2003/04 Premier League final table.

#![allow(dead_code)]

use sqlhelper::{Record, Store};

pub const TABLE: &str = "epl_03_04";

pub const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS epl_03_04 (
    Pos INTEGER NOT NULL,
    Team TEXT NOT NULL,
    Pld INTEGER NOT NULL,
    W INTEGER NOT NULL,
    D INTEGER NOT NULL,
    L INTEGER NOT NULL,
    GF INTEGER NOT NULL,
    GA INTEGER NOT NULL,
    GD INTEGER NOT NULL,
    Pts INTEGER NOT NULL)";

/// (Pos, Team, W, D, L, GF, GA, GD, Pts); every team played 38.
const TEAMS: [(i64, &str, i64, i64, i64, i64, i64, i64, i64); 20] = [
    (1, "Arsenal", 26, 12, 0, 73, 26, 47, 90),
    (2, "Chelsea", 24, 7, 7, 67, 30, 37, 79),
    (3, "Manchester United", 23, 6, 9, 64, 35, 29, 75),
    (4, "Liverpool", 16, 12, 10, 55, 37, 18, 60),
    (5, "Newcastle", 13, 17, 8, 52, 40, 12, 56),
    (6, "Aston Villa", 15, 11, 12, 48, 44, 4, 56),
    (7, "Charlton", 14, 11, 13, 51, 51, 0, 53),
    (8, "Bolton", 14, 11, 13, 48, 56, -8, 53),
    (9, "Fulham", 14, 10, 14, 52, 46, 6, 52),
    (10, "Birmingham", 12, 14, 12, 43, 48, -5, 50),
    (11, "Middlesbrough", 13, 9, 16, 44, 52, -8, 48),
    (12, "Southampton", 12, 11, 15, 44, 45, -1, 47),
    (13, "Portsmouth", 12, 9, 17, 47, 54, -7, 45),
    (14, "Tottenham", 13, 6, 19, 47, 57, -10, 45),
    (15, "Blackburn Rovers", 12, 8, 18, 51, 59, -8, 44),
    (16, "Manchester City", 9, 14, 15, 55, 54, 1, 41),
    (17, "Everton", 9, 12, 17, 45, 57, -12, 39),
    (18, "Leicester City", 6, 15, 17, 48, 65, -17, 33),
    (19, "Leeds United", 8, 9, 21, 40, 79, -39, 33),
    (20, "Wolves", 7, 12, 19, 38, 77, -39, 33),
];

pub fn team_records() -> Vec<Record> {
    TEAMS
        .iter()
        .map(|&(pos, team, w, d, l, gf, ga, gd, pts)| {
            Record::new()
                .with("Pos", pos)
                .with("Team", team)
                .with("Pld", 38i64)
                .with("W", w)
                .with("D", d)
                .with("L", l)
                .with("GF", gf)
                .with("GA", ga)
                .with("GD", gd)
                .with("Pts", pts)
        })
        .collect()
}

/// Create the table and insert all 20 teams, returning the assigned row ids.
pub fn populate(store: &dyn Store) -> Vec<i64> {
    store.execute_raw(CREATE_TABLE).unwrap();
    team_records()
        .iter()
        .map(|team| store.insert(TABLE, team).unwrap())
        .collect()
}
