//! Journal round-trip and replay verification.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::BTreeMap;

use ec4x_core::{GameConfig, GameSetup, new_game, resolve_turn, turn_seed};
use ec4x_persist::{
    ENGINE_VERSION, FileJournal, Genesis, MemoryStore, TurnRecord, TurnStore, replay,
};
use ec4x_types::{CommandPacket, GameId, HouseId};

fn setup() -> (GameSetup, GameConfig) {
    let setup = GameSetup {
        game_id: GameId::from(uuid::Uuid::from_u128(99)),
        seed: 17,
        ..GameSetup::default()
    };
    (setup, GameConfig::default())
}

/// Play `turns` quiet turns into a store.
fn play_into(store: &mut impl TurnStore, turns: u32) {
    let (setup, config) = setup();
    let mut state = new_game(&setup, &config).expect("new game");
    store
        .write_genesis(Genesis {
            engine_version: ENGINE_VERSION.to_owned(),
            game_id: state.game_id,
            initial_state: state.clone(),
        })
        .expect("genesis");

    for _ in 0..turns {
        let seed = turn_seed(state.game_id, state.turn);
        let packets: BTreeMap<HouseId, CommandPacket> = BTreeMap::new();
        let turn = state.turn;
        let outcome = resolve_turn(&state, &packets, &config, seed);
        store
            .append_turn(TurnRecord {
                engine_version: ENGINE_VERSION.to_owned(),
                turn,
                seed,
                packets,
                state: outcome.state.clone(),
                events: outcome.events,
            })
            .expect("append");
        state = outcome.state;
    }
}

#[test]
fn memory_store_replays_bit_exactly() {
    let (_, config) = setup();
    let mut store = MemoryStore::new();
    play_into(&mut store, 4);
    let final_state = replay(&store, &config).expect("replay");
    assert_eq!(Some(&final_state), store.latest_state());
    assert_eq!(final_state.turn, 5);
}

#[test]
fn file_journal_survives_reopen() {
    let (_, config) = setup();
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("game.jsonl");

    {
        let mut journal = FileJournal::create(&path).expect("create");
        play_into(&mut journal, 3);
    }

    let journal = FileJournal::open(&path).expect("open");
    assert_eq!(journal.turns().len(), 3);
    let final_state = replay(&journal, &config).expect("replay");
    assert_eq!(final_state.turn, 4);
}

#[test]
fn out_of_order_appends_are_refused() {
    let mut store = MemoryStore::new();
    play_into(&mut store, 2);
    let Some(last) = store.turns().last().cloned() else {
        return;
    };
    let result = store.append_turn(last);
    assert!(matches!(
        result,
        Err(ec4x_persist::PersistError::OutOfOrder { .. })
    ));
}

#[test]
fn genesis_must_come_first() {
    let mut store = MemoryStore::new();
    let record = TurnRecord {
        engine_version: ENGINE_VERSION.to_owned(),
        turn: 1,
        seed: 0,
        packets: BTreeMap::new(),
        state: {
            let (setup, config) = setup();
            new_game(&setup, &config).expect("new game")
        },
        events: Vec::new(),
    };
    assert!(matches!(
        store.append_turn(record),
        Err(ec4x_persist::PersistError::MissingGenesis)
    ));
}
