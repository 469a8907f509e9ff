use git_relver::boundary::BoundaryWarning;
use git_relver::ui;

// ============================================================================
// BoundaryWarning Display Tests
// ============================================================================

#[test]
fn test_boundary_warning_unreadable_change_file_display() {
    let warning = BoundaryWarning::UnreadableChangeFile {
        path: ".relver/changes/broken.json".to_string(),
        reason: "expected value at line 1 column 1".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(
        display_msg.contains("Unable to read the change file"),
        "Message should describe the unreadable file, got: {}",
        display_msg
    );
    assert!(
        display_msg.contains(".relver/changes/broken.json"),
        "Message should contain the path, got: {}",
        display_msg
    );
    assert!(
        display_msg.contains("expected value"),
        "Message should contain the reason, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_undeletable_change_file_display() {
    let warning = BoundaryWarning::UndeletableChangeFile {
        path: ".relver/changes/a.json".to_string(),
        reason: "permission denied".to_string(),
    };

    let display_msg = warning.to_string();
    assert!(display_msg.contains("Unable to delete the change file"));
    assert!(display_msg.contains("permission denied"));
}

#[test]
fn test_boundary_warning_unparsable_commits_display() {
    let one = BoundaryWarning::UnparsableCommits { count: 1 }.to_string();
    assert_eq!(one, "Skipped 1 commit without a conventional header");

    let many = BoundaryWarning::UnparsableCommits { count: 3 }.to_string();
    assert_eq!(many, "Skipped 3 commits without a conventional header");
}

#[test]
fn test_boundary_warning_nothing_to_release_display() {
    let display_msg = BoundaryWarning::NothingToRelease.to_string();
    assert!(
        display_msg.contains("nothing was released"),
        "Message should say nothing was released, got: {}",
        display_msg
    );
}

#[test]
fn test_boundary_warning_equality() {
    assert_eq!(
        BoundaryWarning::UnparsableCommits { count: 2 },
        BoundaryWarning::UnparsableCommits { count: 2 }
    );
    assert_ne!(
        BoundaryWarning::UnparsableCommits { count: 2 },
        BoundaryWarning::NothingToRelease
    );
}

// ============================================================================
// UI display functions
// ============================================================================

#[test]
fn test_display_boundary_warning_every_variant() {
    // Output goes to stderr; this only checks nothing panics
    let warnings = vec![
        BoundaryWarning::UnreadableChangeFile {
            path: "a.json".to_string(),
            reason: "bad".to_string(),
        },
        BoundaryWarning::UndeletableChangeFile {
            path: "b.json".to_string(),
            reason: "busy".to_string(),
        },
        BoundaryWarning::UnparsableCommits { count: 4 },
        BoundaryWarning::NothingToRelease,
    ];

    for warning in &warnings {
        ui::display_boundary_warning(warning);
    }
}
