use bandmate_core::db::open_db_in_memory;
use bandmate_core::{
    apply_task_mutation, Assignment, Board, BoardRepository, BoardValidationError, RepoError,
    SqliteBoardRepository, TaskDraft, TaskMutation, TaskPriority,
};
use uuid::Uuid;

fn seeded_boards() -> Vec<Board> {
    let boards = vec![Board::new("My tasks", "You"), Board::new("Sam's tasks", "Sam")];
    let mut draft = TaskDraft::new("arrange strings", Assignment::All);
    draft.priority = TaskPriority::High;
    let first = apply_task_mutation(&boards, TaskMutation::Create(draft), 10);
    apply_task_mutation(
        &first.boards,
        TaskMutation::Create(TaskDraft::new(
            "sam demo",
            Assignment::Single("Sam".to_string()),
        )),
        20,
    )
    .boards
}

#[test]
fn replace_and_load_roundtrip_preserves_order_and_fields() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();
    let project = repo.create_project("Summer EP").unwrap();

    let boards = seeded_boards();
    repo.replace_boards(project.id, &boards).unwrap();

    let loaded = repo.load_boards(project.id).unwrap();
    assert_eq!(loaded, boards);
    assert_eq!(loaded[1].tasks[0].priority, TaskPriority::High);
    assert_eq!(loaded[0].tasks[0].assigned_to, Assignment::All);
}

#[test]
fn replace_overwrites_previous_snapshot() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();
    let project = repo.create_project("Summer EP").unwrap();

    repo.replace_boards(project.id, &seeded_boards()).unwrap();
    let fresh = vec![Board::new("Only board", "You")];
    repo.replace_boards(project.id, &fresh).unwrap();

    assert_eq!(repo.load_boards(project.id).unwrap(), fresh);
}

#[test]
fn unknown_project_returns_project_not_found() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();
    let missing = Uuid::new_v4();

    let err = repo.load_boards(missing).unwrap_err();
    assert!(matches!(err, RepoError::ProjectNotFound(id) if id == missing));

    let err = repo.replace_boards(missing, &[]).unwrap_err();
    assert!(matches!(err, RepoError::ProjectNotFound(id) if id == missing));
}

#[test]
fn inconsistent_snapshot_is_rejected_and_previous_kept() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();
    let project = repo.create_project("Summer EP").unwrap();

    let boards = seeded_boards();
    repo.replace_boards(project.id, &boards).unwrap();

    let mut broken = boards.clone();
    broken[0].tasks.clear();
    let err = repo.replace_boards(project.id, &broken).unwrap_err();
    assert!(matches!(
        err,
        RepoError::InconsistentSnapshot(ref violations) if !violations.is_empty()
    ));

    assert_eq!(repo.load_boards(project.id).unwrap(), boards);
}

#[test]
fn projects_do_not_share_boards() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();
    let first = repo.create_project("EP").unwrap();
    let second = repo.create_project("Single").unwrap();

    repo.replace_boards(first.id, &seeded_boards()).unwrap();
    assert!(repo.load_boards(second.id).unwrap().is_empty());
}

#[test]
fn board_owned_by_reserved_literal_is_rejected() {
    let conn = open_db_in_memory().unwrap();
    let repo = SqliteBoardRepository::try_new(&conn).unwrap();
    let project = repo.create_project("Summer EP").unwrap();

    let boards = vec![Board::new("My tasks", "You"), Board::new("Shared", "Both")];
    let err = repo.replace_boards(project.id, &boards).unwrap_err();
    assert!(matches!(
        err,
        RepoError::InvalidBoard(BoardValidationError::ReservedOwner)
    ));
    assert!(repo.load_boards(project.id).unwrap().is_empty());
}
