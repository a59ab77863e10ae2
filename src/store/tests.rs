use super::*;
use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

fn store() -> ClusterStore {
    ClusterStore::open_in_memory().unwrap()
}

#[test]
fn test_create_and_get_job() {
    let store = store();
    let targets = vec![Uuid::new_v4(), Uuid::new_v4()];

    let created = store.create_job(3, &targets).unwrap();
    assert_eq!(created.status, JobStatus::Pending);
    assert_eq!(created.n_clusters, 3);
    assert!(created.started_at.is_none());
    assert!(created.finished_at.is_none());

    let loaded = store.get_job(created.id).unwrap().unwrap();
    assert_eq!(loaded.id, created.id);
    assert_eq!(loaded.n_clusters, 3);
    assert_eq!(loaded.target_ids, targets);
    assert_eq!(loaded.status, JobStatus::Pending);
}

#[test]
fn test_get_unknown_job_is_none() {
    let store = store();
    assert!(store.get_job(Uuid::new_v4()).unwrap().is_none());
}

#[test]
fn test_claim_wins_exactly_once() {
    let store = store();
    let job = store.create_job(2, &[Uuid::new_v4()]).unwrap();

    assert!(store.mark_running(job.id, Utc::now()).unwrap());
    // Second claim loses: the job is no longer pending
    assert!(!store.mark_running(job.id, Utc::now()).unwrap());

    let loaded = store.get_job(job.id).unwrap().unwrap();
    assert_eq!(loaded.status, JobStatus::Running);
    assert!(loaded.started_at.is_some());
}

#[test]
fn test_claim_on_unknown_job_loses() {
    let store = store();
    assert!(!store.mark_running(Uuid::new_v4(), Utc::now()).unwrap());
}

#[test]
fn test_mark_finished_records_outcome() {
    let store = store();
    let job = store.create_job(2, &[Uuid::new_v4()]).unwrap();
    store.mark_running(job.id, Utc::now()).unwrap();
    store.mark_finished(job.id, JobStatus::Done, Utc::now()).unwrap();

    let loaded = store.get_job(job.id).unwrap().unwrap();
    assert_eq!(loaded.status, JobStatus::Done);
    assert!(loaded.finished_at.is_some());
    assert!(loaded.started_at.unwrap() <= loaded.finished_at.unwrap());
}

#[test]
fn test_mark_finished_rejects_unknown_job_and_non_terminal_status() {
    let store = store();
    assert!(store
        .mark_finished(Uuid::new_v4(), JobStatus::Failed, Utc::now())
        .is_err());

    let job = store.create_job(2, &[Uuid::new_v4()]).unwrap();
    assert!(store
        .mark_finished(job.id, JobStatus::Running, Utc::now())
        .is_err());
}

#[test]
fn test_mark_finished_never_leaves_terminal_state() {
    let store = store();
    let job = store.create_job(2, &[Uuid::new_v4()]).unwrap();
    store.mark_running(job.id, Utc::now()).unwrap();
    store.mark_finished(job.id, JobStatus::Done, Utc::now()).unwrap();
    let done = store.get_job(job.id).unwrap().unwrap();

    assert!(store
        .mark_finished(job.id, JobStatus::Failed, Utc::now())
        .is_err());

    let loaded = store.get_job(job.id).unwrap().unwrap();
    assert_eq!(loaded.status, JobStatus::Done);
    assert_eq!(loaded.finished_at, done.finished_at);
}

#[test]
fn test_datapoint_round_trip() {
    let store = store();
    let payload = json!({ "x": 1.5, "note": "hello" });

    let point = store.insert_datapoint(payload.clone()).unwrap();
    let loaded = store.get_datapoint(point.id).unwrap().unwrap();

    assert_eq!(loaded.id, point.id);
    assert_eq!(loaded.payload, payload);
}

#[test]
fn test_load_datapoints_skips_missing_and_keeps_order() {
    let store = store();
    let a = store.insert_datapoint(json!({ "x": 1 })).unwrap();
    let b = store.insert_datapoint(json!({ "x": 2 })).unwrap();

    let loaded = store
        .load_datapoints(&[b.id, Uuid::new_v4(), a.id])
        .unwrap();

    let ids: Vec<Uuid> = loaded.iter().map(|p| p.id).collect();
    assert_eq!(ids, vec![b.id, a.id]);
}

#[test]
fn test_results_round_trip_ordered_by_label() {
    let store = store();
    let job = store.create_job(2, &[Uuid::new_v4()]).unwrap();

    let point_a = Uuid::new_v4();
    let point_b = Uuid::new_v4();
    let point_c = Uuid::new_v4();

    // Insert out of label order; reads must come back sorted
    let cluster_one = Cluster {
        id: Uuid::new_v4(),
        job_id: job.id,
        label: 1,
        centroid: vec![10.0, 0.5],
    };
    let cluster_zero = Cluster {
        id: Uuid::new_v4(),
        job_id: job.id,
        label: 0,
        centroid: vec![0.0, 0.5],
    };
    let memberships = vec![
        ClusterMembership {
            cluster_id: cluster_zero.id,
            datapoint_id: point_a,
            distance: 0.5,
        },
        ClusterMembership {
            cluster_id: cluster_zero.id,
            datapoint_id: point_b,
            distance: 0.5,
        },
        ClusterMembership {
            cluster_id: cluster_one.id,
            datapoint_id: point_c,
            distance: 0.0,
        },
    ];

    store
        .save_results(job.id, &[cluster_one.clone(), cluster_zero.clone()], &memberships)
        .unwrap();

    let results = store.get_results(job.id).unwrap();
    assert_eq!(results.len(), 2);
    assert_eq!(results[0].label, 0);
    assert_eq!(results[0].centroid, vec![0.0, 0.5]);
    assert_eq!(results[0].members, vec![point_a, point_b]);
    assert_eq!(results[1].label, 1);
    assert_eq!(results[1].centroid, vec![10.0, 0.5]);
    assert_eq!(results[1].members, vec![point_c]);
}

#[test]
fn test_results_empty_for_job_without_results() {
    let store = store();
    let job = store.create_job(2, &[Uuid::new_v4()]).unwrap();
    assert!(store.get_results(job.id).unwrap().is_empty());
}

#[test]
fn test_duplicate_label_rolls_back_whole_write() {
    let store = store();
    let job = store.create_job(2, &[Uuid::new_v4()]).unwrap();

    let duplicated = vec![
        Cluster {
            id: Uuid::new_v4(),
            job_id: job.id,
            label: 0,
            centroid: vec![1.0],
        },
        Cluster {
            id: Uuid::new_v4(),
            job_id: job.id,
            label: 0,
            centroid: vec![2.0],
        },
    ];

    assert!(store.save_results(job.id, &duplicated, &[]).is_err());
    // Nothing from the failed transaction is visible
    assert!(store.get_results(job.id).unwrap().is_empty());
}
