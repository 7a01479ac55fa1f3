use futures::{stream, StreamExt};
use settle::{
    producer::Emitter,
    stream::{bucket_stream, into_stream},
    Bucket,
    Item,
};

#[settle::test]
async fn forwards_items_until_end() {
    let source = Emitter::<&str, String>::new();
    let mut events = into_stream(source.clone());
    source.data("a");
    source.data("b");
    source.end();
    source.data("c");

    assert_eq!(events.next().await, Some(Ok("a")));
    assert_eq!(events.next().await, Some(Ok("b")));
    assert_eq!(events.next().await, None);
    assert_eq!(events.next().await, None);
}

#[settle::test]
async fn failure_is_the_last_element() {
    let source = Emitter::<u8, String>::new();
    let events = into_stream(source.clone());
    source.data(1);
    source.error("broken pipe".to_owned());
    source.data(2);
    source.end();

    let collected: Vec<_> = events.collect().await;
    assert_eq!(collected, vec![Ok(1), Err("broken pipe".to_owned())]);
}

#[settle::test]
async fn dropped_producer_ends_stream() {
    let source = Emitter::<u8, String>::new();
    let events = into_stream(source.clone());
    source.data(7);
    drop(source);

    let collected: Vec<_> = events.collect().await;
    assert_eq!(collected, vec![Ok(7)]);
}

#[settle::test]
async fn buckets_text_stream() {
    let chunks = stream::iter(
        ["foo", "bar"].into_iter().map(|chunk| Ok::<_, String>(Item::<()>::from(chunk))),
    );
    assert_eq!(
        bucket_stream(chunks).await,
        Ok(Bucket::Text("foobar".to_owned()))
    );
}

#[settle::test]
async fn bucket_stream_stops_at_first_failure() {
    let chunks = stream::iter(vec![
        Ok(Item::<()>::from(vec![1u8])),
        Err("reset"),
        Ok(Item::from(vec![2u8])),
    ]);
    assert_eq!(bucket_stream(chunks).await, Err("reset"));
}

#[settle::test]
async fn buckets_events_of_a_producer() {
    let source = Emitter::<Item<u16>, String>::new();
    let events = into_stream(source.clone());
    source.data(Item::Value(80));
    source.data(Item::Value(443));
    source.end();

    assert_eq!(
        bucket_stream(events).await,
        Ok(Bucket::Items(vec![Item::Value(80), Item::Value(443)]))
    );
}
