// crates/sweeper-core/tests/session_scenarios.rs
use sweeper_core::{
    BoardSpec, Command, Event, JoinRejection, Phase, PlayerId, Point, Session, SessionConfig,
};
use sweeper_protocol::format_event;

fn config(width: usize, height: usize, min_players: usize, max_players: usize) -> SessionConfig {
    SessionConfig {
        board: BoardSpec {
            width,
            height,
            mine_count: 0,
            loss_threshold: 1,
        },
        max_players,
        min_players,
        seed: Some(1),
    }
}

fn lines(events: &[Event]) -> Vec<String> {
    events.iter().map(format_event).collect()
}

fn join(session: &mut Session) -> PlayerId {
    session.join().expect("join accepted").0
}

/// Joins `n` players and readies all of them.
fn start_with(session: &mut Session, n: usize) -> (Vec<PlayerId>, Vec<String>) {
    let players: Vec<PlayerId> = (0..n).map(|_| join(session)).collect();
    let mut out = Vec::new();
    for &p in &players {
        out = lines(&session.process(p, Command::Ready));
    }
    assert_eq!(session.phase(), Phase::Active);
    (players, out)
}

#[test]
fn join_hands_out_sequential_ids() {
    let mut session = Session::new(config(4, 4, 2, 4)).unwrap();

    let (first, events) = session.join().unwrap();
    assert_eq!(first, PlayerId(1));
    assert_eq!(lines(&events), vec!["CURRENT_PLAYER_NUMBER 1", "PLAYERS_CONNECTED 1"]);

    let (second, events) = session.join().unwrap();
    assert_eq!(second, PlayerId(2));
    assert_eq!(lines(&events), vec!["CURRENT_PLAYER_NUMBER 2", "PLAYERS_CONNECTED 2"]);
}

#[test]
fn round_starts_when_everyone_is_ready() {
    let mut session = Session::new(config(4, 4, 2, 4)).unwrap();
    let a = join(&mut session);
    let b = join(&mut session);

    let waiting = session.process(a, Command::Ready);
    assert_eq!(lines(&waiting), vec!["WAITING_FOR_PLAYERS 1/2"]);
    assert_eq!(session.phase(), Phase::Lobby);

    // Voting twice changes nothing.
    assert!(session.process(a, Command::Ready).is_empty());

    let started = session.process(b, Command::Ready);
    assert_eq!(lines(&started), vec!["GAME_STARTED", "TURN_CHANGED 1"]);
    assert_eq!(session.current_player(), Some(a));
}

#[test]
fn min_players_holds_the_lobby() {
    let mut session = Session::new(config(4, 4, 2, 4)).unwrap();
    let a = join(&mut session);

    let events = session.process(a, Command::Ready);
    assert_eq!(lines(&events), vec!["WAITING_FOR_PLAYERS 1/1"]);
    assert_eq!(session.phase(), Phase::Lobby);
}

#[test]
fn ready_after_start_is_ignored() {
    let mut session = Session::new(config(4, 4, 1, 4)).unwrap();
    let (players, _) = start_with(&mut session, 1);
    assert!(session.process(players[0], Command::Ready).is_empty());
    assert_eq!(session.phase(), Phase::Active);
}

#[test]
fn turns_rotate_in_join_order_and_skip_quitters() {
    let mines = [Point::new(4, 4)];
    let mut session = Session::with_mines(config(5, 5, 3, 4), &mines).unwrap();
    let (players, started) = start_with(&mut session, 3);
    assert_eq!(started, vec!["GAME_STARTED", "TURN_CHANGED 1"]);

    // (3,3) touches the mine, so only one cell opens and the game goes on.
    let events = lines(&session.process(players[0], Command::Move { x: 3, y: 3 }));
    assert_eq!(
        events,
        vec!["CELL_UPDATE 3 3 true 1", "SCORE_UPDATE 1", "TURN_CHANGED 2"]
    );

    let events = lines(&session.process(players[1], Command::Quit));
    assert_eq!(events, vec!["PLAYER_QUIT 2", "PLAYERS_CONNECTED 2", "TURN_CHANGED 3"]);
    assert_eq!(session.current_player(), Some(players[2]));

    let events = lines(&session.process(players[2], Command::Move { x: 4, y: 3 }));
    assert_eq!(events.last().map(String::as_str), Some("TURN_CHANGED 1"));
}

#[test]
fn quitting_before_the_turn_holder_keeps_the_turn() {
    let mines = [Point::new(4, 4)];
    let mut session = Session::with_mines(config(5, 5, 3, 4), &mines).unwrap();
    let (players, _) = start_with(&mut session, 3);
    session.process(players[0], Command::Move { x: 3, y: 3 });
    assert_eq!(session.current_player(), Some(players[1]));

    let events = lines(&session.process(players[0], Command::Quit));
    assert_eq!(events, vec!["PLAYER_QUIT 1", "PLAYERS_CONNECTED 2"]);
    assert_eq!(session.current_player(), Some(players[1]));
}

#[test]
fn wrong_player_cannot_touch_the_board() {
    let mut session = Session::new(config(4, 4, 2, 4)).unwrap();
    let (players, _) = start_with(&mut session, 2);
    let before = session.board().clone();

    let events = session.process(players[1], Command::Move { x: 0, y: 0 });
    assert_eq!(lines(&events), vec!["NOT_YOUR_TURN"]);
    let events = session.process(players[1], Command::Flag { x: 0, y: 0, flagged: true });
    assert_eq!(lines(&events), vec!["NOT_YOUR_TURN"]);

    assert_eq!(session.board(), &before);
}

#[test]
fn moves_outside_an_active_round_are_rejected() {
    let mut session = Session::new(config(4, 4, 2, 4)).unwrap();
    let a = join(&mut session);
    let events = session.process(a, Command::Move { x: 0, y: 0 });
    assert_eq!(lines(&events), vec!["ROUND_NOT_ACTIVE"]);
    assert_eq!(session.board().revealed_count(), 0);
}

#[test]
fn empty_board_is_won_in_one_flood_fill() {
    let mut session = Session::new(config(4, 4, 1, 4)).unwrap();
    let (players, _) = start_with(&mut session, 1);

    let events = lines(&session.process(players[0], Command::Move { x: 0, y: 0 }));
    let updates = events.iter().filter(|l| l.starts_with("CELL_UPDATE")).count();
    assert_eq!(updates, 16);
    assert!(events.iter().all(|l| !l.starts_with("CELL_UPDATE") || l.ends_with("true 0")));
    assert_eq!(
        events[16..].to_vec(),
        vec!["SCORE_UPDATE 16", "GAMEOVER WON", "FINAL_SCORE 1 16"]
    );
    assert_eq!(session.phase(), Phase::Over);
    assert_eq!(session.board().revealed_count(), 16);
}

#[test]
fn first_mine_loses_the_round() {
    let mut session = Session::with_mines(config(4, 4, 2, 4), &[Point::new(2, 2)]).unwrap();
    let (players, _) = start_with(&mut session, 2);

    let events = lines(&session.process(players[0], Command::Move { x: 2, y: 2 }));
    assert_eq!(
        events,
        vec![
            "CELL_UPDATE 2 2 true mine",
            "PLAYER_HIT_MINE 1",
            "SCORE_UPDATE -1",
            "GAMEOVER LOST",
            "FINAL_SCORE 1 -1",
            "FINAL_SCORE 2 0",
        ]
    );
    assert_eq!(session.board().mines_exploded(), 1);
    assert_eq!(session.phase(), Phase::Over);

    let events = session.process(players[1], Command::Move { x: 0, y: 0 });
    assert_eq!(lines(&events), vec!["ROUND_NOT_ACTIVE"]);
}

#[test]
fn higher_loss_threshold_keeps_playing() {
    let mut cfg = config(4, 4, 2, 4);
    cfg.board.loss_threshold = 2;
    let mut session = Session::with_mines(cfg, &[Point::new(0, 0), Point::new(3, 3)]).unwrap();
    let (players, _) = start_with(&mut session, 2);

    let events = lines(&session.process(players[0], Command::Move { x: 0, y: 0 }));
    assert_eq!(events.last().map(String::as_str), Some("TURN_CHANGED 2"));

    let events = lines(&session.process(players[1], Command::Move { x: 3, y: 3 }));
    assert!(events.contains(&"GAMEOVER LOST".to_string()));
}

#[test]
fn policy_rejections_keep_the_turn() {
    let mut session = Session::with_mines(config(4, 4, 1, 4), &[Point::new(0, 0)]).unwrap();
    let (players, _) = start_with(&mut session, 1);
    let p = players[0];

    assert_eq!(
        lines(&session.process(p, Command::Move { x: 4, y: 0 })),
        vec!["OUT_OF_BOUNDS 4 0"]
    );
    assert_eq!(
        lines(&session.process(p, Command::Flag { x: -1, y: 0, flagged: true })),
        vec!["OUT_OF_BOUNDS -1 0"]
    );

    session.process(p, Command::Move { x: 1, y: 0 });
    assert_eq!(
        lines(&session.process(p, Command::Move { x: 1, y: 0 })),
        vec!["ALREADY_REVEALED 1 0"]
    );
    assert_eq!(
        lines(&session.process(p, Command::Flag { x: 1, y: 0, flagged: true })),
        vec!["FLAG_REJECTED 1 0"]
    );
    assert_eq!(session.current_player(), Some(p));
}

#[test]
fn flagging_is_broadcast_and_keeps_the_turn() {
    let mut session = Session::new(config(4, 4, 2, 4)).unwrap();
    let (players, _) = start_with(&mut session, 2);

    let events = session.process(players[0], Command::Flag { x: 1, y: 2, flagged: true });
    assert_eq!(lines(&events), vec!["FLAG_UPDATE 1 2 true"]);
    assert_eq!(session.current_player(), Some(players[0]));
    assert!(session.board().cell(1, 2).unwrap().is_flagged());
}

#[test]
fn joins_are_refused_when_full_or_started() {
    let mut session = Session::new(config(4, 4, 2, 2)).unwrap();
    join(&mut session);
    join(&mut session);
    assert_eq!(session.join().unwrap_err(), JoinRejection::ServerFull);
    assert_eq!(session.roster().len(), 2);

    let mut session = Session::new(config(4, 4, 1, 4)).unwrap();
    start_with(&mut session, 1);
    assert_eq!(session.join().unwrap_err(), JoinRejection::RoundInProgress);
    assert_eq!(format_event(&JoinRejection::RoundInProgress.into()), "ROUND_IN_PROGRESS");
}

#[test]
fn leaving_the_lobby_can_start_the_round() {
    let mut session = Session::new(config(4, 4, 1, 4)).unwrap();
    let a = join(&mut session);
    let b = join(&mut session);
    session.process(a, Command::Ready);

    let events = lines(&session.process(b, Command::Quit));
    assert_eq!(
        events,
        vec!["PLAYER_QUIT 2", "PLAYERS_CONNECTED 1", "GAME_STARTED", "TURN_CHANGED 1"]
    );
}

#[test]
fn empty_lobby_stays_open_but_empty_round_closes() {
    let mut session = Session::new(config(4, 4, 2, 4)).unwrap();
    let a = join(&mut session);
    session.process(a, Command::Quit);
    assert!(!session.is_closed());
    assert_eq!(session.phase(), Phase::Lobby);
    assert_eq!(join(&mut session), PlayerId(2));

    let mut session = Session::new(config(4, 4, 1, 4)).unwrap();
    let (players, _) = start_with(&mut session, 1);
    session.process(players[0], Command::Quit);
    assert!(session.is_closed());
    assert_eq!(session.phase(), Phase::Over);
}

#[test]
fn reset_returns_to_the_lobby() {
    let mut session = Session::with_mines(config(4, 4, 1, 4), &[Point::new(2, 2)]).unwrap();
    let (players, _) = start_with(&mut session, 1);
    let p = players[0];

    assert_eq!(lines(&session.process(p, Command::Reset)), vec!["ROUND_IN_PROGRESS"]);

    session.process(p, Command::Move { x: 2, y: 2 });
    assert_eq!(session.phase(), Phase::Over);

    let events = session.process(p, Command::Reset);
    assert_eq!(lines(&events), vec!["GAME_RESET", "PLAYERS_CONNECTED 1"]);
    assert_eq!(session.phase(), Phase::Lobby);
    assert_eq!(session.board().revealed_count(), 0);
    assert_eq!(session.board().mines_exploded(), 0);
    assert!(session.roster().iter().all(|pl| !pl.ready && pl.score == 0));

    // Same fixed layout on the rematch.
    session.process(p, Command::Ready);
    let events = lines(&session.process(p, Command::Move { x: 2, y: 2 }));
    assert_eq!(events[0], "CELL_UPDATE 2 2 true mine");
}

#[test]
fn round_start_deals_a_fresh_field() {
    let mut cfg = config(8, 8, 1, 4);
    cfg.board.mine_count = 10;
    let mines = |session: &Session| -> Vec<Point> {
        session
            .board()
            .cells()
            .filter(|(_, cell)| cell.is_mine())
            .map(|(point, _)| point)
            .collect()
    };

    let mut first = Session::new(cfg.clone()).unwrap();
    let lobby_mines = mines(&first);
    start_with(&mut first, 1);
    let dealt = mines(&first);
    assert_eq!(dealt.len(), 10);
    assert_ne!(dealt, lobby_mines);
    assert!(first.board().is_started());
    assert_eq!(first.board().revealed_count(), 0);

    // Same seed, same deal.
    let mut second = Session::new(cfg).unwrap();
    start_with(&mut second, 1);
    assert_eq!(mines(&second), dealt);
}

#[test]
fn queries_answer_without_side_effects() {
    let mut session = Session::with_mines(config(3, 3, 2, 4), &[Point::new(0, 0)]).unwrap();
    let a = join(&mut session);
    let b = join(&mut session);

    assert_eq!(lines(&session.process(b, Command::WhoAmI)), vec!["CURRENT_PLAYER_NUMBER 2"]);
    assert_eq!(lines(&session.process(a, Command::IsGameStarted)), vec!["IS_GAME_STARTED false"]);
    assert_eq!(lines(&session.process(a, Command::PlayerCount)), vec!["UPDATE_PLAYER_COUNT 2"]);
    assert_eq!(
        lines(&session.process(a, Command::NeighborCount { x: 1, y: 1 })),
        vec!["NEIGHBORING_MINES_COUNT_RESPONSE 1 1 1"]
    );
    assert_eq!(
        lines(&session.process(a, Command::NeighborCount { x: 5, y: 1 })),
        vec!["OUT_OF_BOUNDS 5 1"]
    );

    session.process(a, Command::Ready);
    session.process(b, Command::Ready);
    assert_eq!(lines(&session.process(a, Command::IsCurrentPlayer)), vec!["IS_CURRENT_ACTIVE_PLAYER true"]);
    assert_eq!(lines(&session.process(b, Command::IsCurrentPlayer)), vec!["IS_CURRENT_ACTIVE_PLAYER false"]);
    assert_eq!(session.board().revealed_count(), 0);
}

#[test]
fn commands_from_unknown_players_are_dropped() {
    let mut session = Session::new(config(4, 4, 1, 4)).unwrap();
    assert!(session.process(PlayerId(9), Command::Ready).is_empty());
    assert!(session.process(PlayerId(9), Command::Quit).is_empty());
}

#[test]
fn shutdown_closes_the_session() {
    let mut session = Session::new(config(4, 4, 1, 4)).unwrap();
    join(&mut session);
    assert_eq!(lines(&session.shutdown()), vec!["SERVER_CLOSING"]);
    assert!(session.is_closed());
    assert_eq!(session.join().unwrap_err(), JoinRejection::RoundInProgress);
}

#[test]
fn invalid_session_configs_are_refused() {
    let mut cfg = config(4, 4, 3, 2);
    assert!(Session::new(cfg.clone()).is_err());

    cfg.min_players = 1;
    cfg.board.mine_count = 16;
    assert!(Session::new(cfg).is_err());
}
